use serde::Serialize;
use thiserror::Error;

/// A diagram vertex. Nodes are identified by their position in
/// [`Diagram::nodes`]; links refer to them by index.
#[derive(Debug, Clone, Serialize)]
pub struct Node {
    pub label: String,
    pub color: String,
}

/// A weighted directed link between two nodes. The value drives the
/// rendered ribbon thickness, nothing else.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Link {
    pub source: usize,
    pub target: usize,
    pub value: f32,
}

#[derive(Debug, Clone, Serialize)]
pub struct Diagram {
    pub title: String,
    pub nodes: Vec<Node>,
    pub links: Vec<Link>,
}

#[derive(Debug, Error)]
pub enum DiagramError {
    #[error("diagram has no nodes")]
    Empty,
    #[error("link {link} references node {index}, but only {count} nodes exist")]
    IndexOutOfRange {
        link: usize,
        index: usize,
        count: usize,
    },
    #[error("link {link} has non-positive value {value}")]
    NonPositiveValue { link: usize, value: f32 },
}

impl Diagram {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            nodes: Vec::new(),
            links: Vec::new(),
        }
    }

    pub fn add_node(&mut self, label: impl Into<String>, color: impl Into<String>) -> usize {
        self.nodes.push(Node {
            label: label.into(),
            color: color.into(),
        });
        self.nodes.len() - 1
    }

    pub fn add_link(&mut self, source: usize, target: usize, value: f32) {
        self.links.push(Link {
            source,
            target,
            value,
        });
    }

    /// Structural checks run once before layout. The builder's literal
    /// data always passes; this fires only if that data is edited
    /// inconsistently.
    pub fn validate(&self) -> Result<(), DiagramError> {
        if self.nodes.is_empty() {
            return Err(DiagramError::Empty);
        }
        let count = self.nodes.len();
        for (idx, link) in self.links.iter().enumerate() {
            for index in [link.source, link.target] {
                if index >= count {
                    return Err(DiagramError::IndexOutOfRange {
                        link: idx,
                        index,
                        count,
                    });
                }
            }
            if link.value <= 0.0 {
                return Err(DiagramError::NonPositiveValue {
                    link: idx,
                    value: link.value,
                });
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn two_node_diagram() -> Diagram {
        let mut diagram = Diagram::new("test");
        diagram.add_node("A", "#111111");
        diagram.add_node("B", "#222222");
        diagram
    }

    #[test]
    fn validate_accepts_consistent_diagram() {
        let mut diagram = two_node_diagram();
        diagram.add_link(0, 1, 2.0);
        assert!(diagram.validate().is_ok());
    }

    #[test]
    fn validate_rejects_empty_diagram() {
        let diagram = Diagram::new("empty");
        assert!(matches!(diagram.validate(), Err(DiagramError::Empty)));
    }

    #[test]
    fn validate_rejects_out_of_range_target() {
        let mut diagram = two_node_diagram();
        diagram.add_link(0, 5, 1.0);
        assert!(matches!(
            diagram.validate(),
            Err(DiagramError::IndexOutOfRange { index: 5, .. })
        ));
    }

    #[test]
    fn validate_rejects_zero_value() {
        let mut diagram = two_node_diagram();
        diagram.add_link(0, 1, 0.0);
        assert!(matches!(
            diagram.validate(),
            Err(DiagramError::NonPositiveValue { .. })
        ));
    }

    #[test]
    fn add_node_returns_positional_index() {
        let mut diagram = Diagram::new("indices");
        assert_eq!(diagram.add_node("first", "#000000"), 0);
        assert_eq!(diagram.add_node("second", "#ffffff"), 1);
        assert_eq!(diagram.nodes.len(), 2);
    }
}
