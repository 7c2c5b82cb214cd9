//! Sankey layout for an index-based diagram. Columns come from a
//! longest-path ranking over a topological order, node heights from the
//! larger of inbound and outbound flow, and ribbon anchor points from
//! the stacking order of links on each side of a node.

use std::collections::VecDeque;

use crate::config::LayoutConfig;
use crate::diagram::Diagram;
use crate::text_metrics::text_width;
use crate::theme::Theme;

#[derive(Debug, Clone)]
pub struct SankeyNode {
    pub index: usize,
    pub label: String,
    pub color: String,
    pub rank: usize,
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
    /// Flow through the node: max(inbound sum, outbound sum).
    pub total: f32,
    pub label_width: f32,
    /// Labels sit to the right of a node except in the last column,
    /// where they would run off the canvas.
    pub label_on_left: bool,
}

#[derive(Debug, Clone)]
pub struct SankeyLink {
    pub source: usize,
    pub target: usize,
    pub value: f32,
    pub thickness: f32,
    /// Midpoint of the ribbon on the source node's right edge.
    pub start: (f32, f32),
    /// Midpoint of the ribbon on the target node's left edge.
    pub end: (f32, f32),
}

#[derive(Debug, Clone)]
pub struct SankeyLayout {
    pub title: String,
    pub width: f32,
    pub height: f32,
    pub nodes: Vec<SankeyNode>,
    pub links: Vec<SankeyLink>,
}

pub fn compute_layout(diagram: &Diagram, theme: &Theme, config: &LayoutConfig) -> SankeyLayout {
    let node_count = diagram.nodes.len();
    let link_count = diagram.links.len();

    let mut incoming: Vec<Vec<usize>> = vec![Vec::new(); node_count];
    let mut outgoing: Vec<Vec<usize>> = vec![Vec::new(); node_count];
    let mut indegree: Vec<usize> = vec![0; node_count];
    let mut in_total: Vec<f32> = vec![0.0; node_count];
    let mut out_total: Vec<f32> = vec![0.0; node_count];

    for (link_idx, link) in diagram.links.iter().enumerate() {
        outgoing[link.source].push(link_idx);
        incoming[link.target].push(link_idx);
        indegree[link.target] += 1;
        out_total[link.source] += link.value;
        in_total[link.target] += link.value;
    }

    let ranks = compute_ranks(node_count, &indegree, &outgoing, &diagram.links);
    let max_rank = ranks.iter().copied().max().unwrap_or(0);
    let num_ranks = max_rank + 1;

    let totals: Vec<f32> = (0..node_count)
        .map(|idx| in_total[idx].max(out_total[idx]).max(f32::EPSILON))
        .collect();

    let mut rank_nodes: Vec<Vec<usize>> = vec![Vec::new(); num_ranks];
    for idx in 0..node_count {
        rank_nodes[ranks[idx]].push(idx);
    }

    // Vertical scale: the busiest column, padding included, must fit.
    let mut scale = f32::INFINITY;
    for column in &rank_nodes {
        if column.is_empty() {
            continue;
        }
        let gaps = (column.len() - 1) as f32 * config.node_padding;
        let flow: f32 = column.iter().map(|&idx| totals[idx]).sum();
        let available = (config.height - gaps).max(1.0);
        scale = scale.min(available / flow);
    }
    if !scale.is_finite() {
        scale = 1.0;
    }

    let gap_x = if num_ranks > 1 {
        ((config.width - config.node_thickness * num_ranks as f32) / (num_ranks - 1) as f32)
            .max(0.0)
    } else {
        0.0
    };

    let top = config.margin + config.title_height;
    let mut node_x = vec![0.0f32; node_count];
    let mut node_y = vec![0.0f32; node_count];
    let mut node_h = vec![0.0f32; node_count];
    for idx in 0..node_count {
        node_x[idx] = config.margin + ranks[idx] as f32 * (config.node_thickness + gap_x);
        node_h[idx] = totals[idx] * scale;
    }

    // Initial placement: stack each column in index order, centered.
    for column in &rank_nodes {
        let gaps = column.len().saturating_sub(1) as f32 * config.node_padding;
        let used: f32 = column.iter().map(|&idx| node_h[idx]).sum::<f32>() + gaps;
        let mut cursor = top + ((config.height - used) / 2.0).max(0.0);
        for &idx in column {
            node_y[idx] = cursor;
            cursor += node_h[idx] + config.node_padding;
        }
    }

    // Per-node link stacking order: outbound by target index, inbound
    // by source index. Offsets accumulate ribbon thicknesses.
    let thickness: Vec<f32> = diagram.links.iter().map(|link| link.value * scale).collect();
    let mut out_order = outgoing.clone();
    for links in &mut out_order {
        links.sort_by_key(|&link_idx| diagram.links[link_idx].target);
    }
    let mut in_order = incoming.clone();
    for links in &mut in_order {
        links.sort_by_key(|&link_idx| diagram.links[link_idx].source);
    }

    let mut out_offset = vec![0.0f32; link_count];
    let mut in_offset = vec![0.0f32; link_count];

    // Alignment sweep borrowed from layered sankey layouts: pull each
    // node up to its first inbound ribbon, keeping column order and
    // padding intact.
    for rank in 1..num_ranks {
        compute_offsets(&out_order, &thickness, &mut out_offset);
        for &idx in &rank_nodes[rank] {
            let mut min_top = f32::INFINITY;
            for &link_idx in &incoming[idx] {
                let from = diagram.links[link_idx].source;
                if ranks[from] >= rank {
                    continue;
                }
                min_top = min_top.min(node_y[from] + out_offset[link_idx]);
            }
            if min_top.is_finite() {
                let max_y = top + (config.height - node_h[idx]).max(0.0);
                node_y[idx] = min_top.clamp(top, max_y);
            }
        }
        // Undo any overlap the alignment introduced.
        let column = &rank_nodes[rank];
        for pos in 1..column.len() {
            let prev = column[pos - 1];
            let idx = column[pos];
            let floor = node_y[prev] + node_h[prev] + config.node_padding;
            if node_y[idx] < floor {
                node_y[idx] = floor;
            }
        }
    }
    compute_offsets(&out_order, &thickness, &mut out_offset);
    compute_offsets(&in_order, &thickness, &mut in_offset);

    let mut max_label_right = 0.0f32;
    let mut nodes = Vec::with_capacity(node_count);
    for idx in 0..node_count {
        let label = diagram.nodes[idx].label.clone();
        let label_width = text_width(&label, theme.font_size, &theme.font_family);
        let label_on_left = ranks[idx] == max_rank;
        if !label_on_left {
            let right = node_x[idx] + config.node_thickness + config.label_gap + label_width;
            max_label_right = max_label_right.max(right);
        }
        nodes.push(SankeyNode {
            index: idx,
            label,
            color: diagram.nodes[idx].color.clone(),
            rank: ranks[idx],
            x: node_x[idx],
            y: node_y[idx],
            width: config.node_thickness,
            height: node_h[idx],
            total: totals[idx],
            label_width,
            label_on_left,
        });
    }

    let mut links = Vec::with_capacity(link_count);
    for (link_idx, link) in diagram.links.iter().enumerate() {
        let half = thickness[link_idx] / 2.0;
        let start = (
            node_x[link.source] + config.node_thickness,
            node_y[link.source] + out_offset[link_idx] + half,
        );
        let end = (
            node_x[link.target],
            node_y[link.target] + in_offset[link_idx] + half,
        );
        links.push(SankeyLink {
            source: link.source,
            target: link.target,
            value: link.value,
            thickness: thickness[link_idx],
            start,
            end,
        });
    }

    let body_right = config.margin + config.width;
    let width = body_right.max(max_label_right) + config.margin;
    let height = top + config.height + config.margin;

    SankeyLayout {
        title: diagram.title.clone(),
        width,
        height,
        nodes,
        links,
    }
}

/// Longest-path ranking over Kahn's topological order. Cycles leave the
/// unreachable remainder at rank 0; the workflow diagram is acyclic so
/// this never triggers in practice.
fn compute_ranks(
    node_count: usize,
    indegree: &[usize],
    outgoing: &[Vec<usize>],
    links: &[crate::diagram::Link],
) -> Vec<usize> {
    let mut ranks = vec![0usize; node_count];
    let mut work = indegree.to_vec();
    let mut queue: VecDeque<usize> = work
        .iter()
        .enumerate()
        .filter_map(|(idx, deg)| (*deg == 0).then_some(idx))
        .collect();
    let mut topo = Vec::with_capacity(node_count);
    while let Some(idx) = queue.pop_front() {
        topo.push(idx);
        for &link_idx in &outgoing[idx] {
            let target = links[link_idx].target;
            if work[target] > 0 {
                work[target] -= 1;
                if work[target] == 0 {
                    queue.push_back(target);
                }
            }
        }
    }
    if topo.len() == node_count {
        for &idx in &topo {
            for &link_idx in &outgoing[idx] {
                let target = links[link_idx].target;
                ranks[target] = ranks[target].max(ranks[idx] + 1);
            }
        }
    }
    ranks
}

fn compute_offsets(order: &[Vec<usize>], thickness: &[f32], offsets: &mut [f32]) {
    for links in order {
        let mut acc = 0.0f32;
        for &link_idx in links {
            offsets[link_idx] = acc;
            acc += thickness[link_idx];
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::workflow::build_diagram;

    fn workflow_layout() -> SankeyLayout {
        let diagram = build_diagram();
        compute_layout(&diagram, &Theme::fastrecon(), &LayoutConfig::default())
    }

    #[test]
    fn workflow_spans_eight_ranks() {
        let layout = workflow_layout();
        let max_rank = layout.nodes.iter().map(|n| n.rank).max().unwrap();
        assert_eq!(max_rank, 7);
        assert_eq!(layout.nodes[0].rank, 0);
        assert_eq!(layout.nodes[28].rank, 7);
    }

    #[test]
    fn every_link_connects_adjacent_node_edges() {
        let layout = workflow_layout();
        for link in &layout.links {
            let source = &layout.nodes[link.source];
            let target = &layout.nodes[link.target];
            assert_eq!(link.start.0, source.x + source.width);
            assert_eq!(link.end.0, target.x);
            assert!(link.thickness > 0.0);
        }
    }

    #[test]
    fn ribbons_stay_within_their_nodes() {
        let layout = workflow_layout();
        let eps = 0.01;
        for link in &layout.links {
            let source = &layout.nodes[link.source];
            let half = link.thickness / 2.0;
            assert!(link.start.1 - half >= source.y - eps);
            assert!(link.start.1 + half <= source.y + source.height + eps);
            let target = &layout.nodes[link.target];
            assert!(link.end.1 - half >= target.y - eps);
            assert!(link.end.1 + half <= target.y + target.height + eps);
        }
    }

    #[test]
    fn columns_never_overlap_vertically() {
        let layout = workflow_layout();
        let max_rank = layout.nodes.iter().map(|n| n.rank).max().unwrap();
        for rank in 0..=max_rank {
            let mut column: Vec<_> = layout.nodes.iter().filter(|n| n.rank == rank).collect();
            column.sort_by(|a, b| a.y.partial_cmp(&b.y).unwrap());
            for pair in column.windows(2) {
                assert!(
                    pair[0].y + pair[0].height <= pair[1].y + 0.01,
                    "rank {rank} nodes {} and {} overlap",
                    pair[0].index,
                    pair[1].index
                );
            }
        }
    }

    #[test]
    fn node_height_tracks_flow_total() {
        let layout = workflow_layout();
        // Input node carries 8 units out, the stage node 5 in / 9 out.
        let input = &layout.nodes[0];
        let stage = &layout.nodes[1];
        assert_eq!(input.total, 8.0);
        assert_eq!(stage.total, 9.0);
        assert!(stage.height > input.height);
    }

    #[test]
    fn layout_is_deterministic() {
        let a = workflow_layout();
        let b = workflow_layout();
        for (na, nb) in a.nodes.iter().zip(&b.nodes) {
            assert_eq!((na.x, na.y, na.height), (nb.x, nb.y, nb.height));
        }
        for (la, lb) in a.links.iter().zip(&b.links) {
            assert_eq!((la.start, la.end), (lb.start, lb.end));
        }
    }

    #[test]
    fn last_column_labels_flip_to_the_left() {
        let layout = workflow_layout();
        for node in &layout.nodes {
            assert_eq!(node.label_on_left, node.rank == 7, "node {}", node.index);
        }
    }
}
