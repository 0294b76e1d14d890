// Graph Export - JSON document handed to the external renderer
// Node order matches graph insertion order so colour lists stay aligned

use serde::{Deserialize, Serialize};
use std::path::Path;

use super::note_graph::NoteGraph;
use super::types::EdgeKind;
use crate::levels::Rgb;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExportNode {
    /// Display id, `"{pitch}_{time}"`
    pub id: String,
    pub pitch: u8,

    /// Position on the time axis in seconds
    pub time: f64,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub duration: Option<f64>,

    /// `#rrggbb`, present for per-frame graphs
    #[serde(skip_serializing_if = "Option::is_none")]
    pub colour: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExportEdge {
    pub from: String,
    pub to: String,
    pub kind: EdgeKind,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GraphExport {
    pub nodes: Vec<ExportNode>,
    pub edges: Vec<ExportEdge>,
}

impl GraphExport {
    /// Flatten a graph; `colours`, when given, must have one entry per node
    pub fn from_graph(graph: &NoteGraph, colours: Option<&[Rgb]>) -> Self {
        let nodes = graph
            .nodes()
            .enumerate()
            .map(|(i, node)| ExportNode {
                id: node.key.to_string(),
                pitch: node.position.pitch,
                time: node.position.time,
                duration: node.duration,
                colour: colours.and_then(|c| c.get(i)).map(|rgb| rgb.to_hex()),
            })
            .collect();

        let edges = graph
            .edges()
            .map(|edge| ExportEdge {
                from: edge.from.to_string(),
                to: edge.to.to_string(),
                kind: edge.kind,
            })
            .collect();

        GraphExport { nodes, edges }
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Write pretty JSON to `path`
    pub fn write_to(&self, path: &Path) -> std::io::Result<()> {
        let json = self.to_json().map_err(std::io::Error::other)?;
        std::fs::write(path, json)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::{FrameGraphBuilder, RunGraphBuilder};
    use crate::levels::{get_level, ColourMap};
    use crate::roll::{ActivationMatrix, NoteAnnotator};
    use tempfile::TempDir;

    fn expert_label(rows: &[Vec<f32>]) -> crate::roll::NoteLabel {
        let range = get_level("expert").unwrap().pitch_range;
        let matrix = ActivationMatrix::from_rows(rows).unwrap();
        NoteAnnotator::new(range).unwrap().annotate(&matrix).unwrap()
    }

    #[test]
    fn test_export_frame_graph_with_colours() {
        let mut rows = vec![vec![0.0; 2]; 6];
        rows[1] = vec![1.0, 1.0];
        rows[2] = vec![1.0, 0.0];
        let label = expert_label(&rows);

        let colours = ColourMap::from_level(&get_level("expert").unwrap()).unwrap();
        let built = FrameGraphBuilder::new(44.0, colours).unwrap().build(&label).unwrap();
        let export = GraphExport::from_graph(&built.graph, Some(&built.colours));

        assert_eq!(export.nodes.len(), 3);
        assert_eq!(export.nodes[0].id, "96_0");
        assert_eq!(export.nodes[0].colour.as_deref(), Some("#1ae81a"));
        assert_eq!(export.nodes[1].colour.as_deref(), Some("#d40f15"));
        assert_eq!(export.edges.len(), 3);
        assert!(export
            .edges
            .iter()
            .any(|e| e.from == "96_0" && e.to == "96_1" && e.kind == EdgeKind::Sustain));
    }

    #[test]
    fn test_export_run_graph_json() {
        let mut rows = vec![vec![0.0; 4]; 6];
        rows[0] = vec![1.0, 1.0, 0.0, 0.0];
        let label = expert_label(&rows);

        let graph = RunGraphBuilder::new(4.0).unwrap().build(&label).unwrap();
        let json = GraphExport::from_graph(&graph, None).to_json().unwrap();

        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["nodes"][0]["id"], "95_0.000000");
        assert_eq!(value["nodes"][0]["duration"], 0.5);
        assert!(value["nodes"][0].get("colour").is_none());
        assert_eq!(value["edges"].as_array().unwrap().len(), 0);
    }

    #[test]
    fn test_write_to_file() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("graph.json");

        let label = expert_label(&vec![vec![1.0; 3]; 6]);
        let graph = RunGraphBuilder::new(44.0).unwrap().build(&label).unwrap();
        let export = GraphExport::from_graph(&graph, None);
        export.write_to(&path).unwrap();

        let read_back: GraphExport =
            serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(read_back, export);
        assert_eq!(read_back.nodes.len(), 6);
        assert_eq!(read_back.edges.len(), 30);
    }
}
