//! Contour extraction from selection masks.
//!
//! Traces the boundary between selected and unselected pixels along pixel
//! edges, giving closed polygons for marching ants display. Vertices sit on
//! integer pixel corners; pixel `(x, y)` covers `[x, x + 1] x [y, y + 1]`.

use std::collections::HashMap;

use super::mask::Mask;

/// Extract all contours from a mask.
///
/// # Returns
/// Flat array: [num_contours, len1, x1, y1, x2, y2, ..., len2, ...]
pub fn extract_contours(mask: &Mask) -> Vec<f32> {
    let contours = trace_outlines(mask);

    let mut result = Vec::new();
    result.push(contours.len() as f32);

    for contour in contours {
        result.push(contour.len() as f32);
        for (x, y) in contour {
            result.push(x);
            result.push(y);
        }
    }

    result
}

type Vertex = (i32, i32);

/// Check if pixel is selected (treating out-of-bounds as unselected).
#[inline]
fn is_selected(mask: &Mask, x: i32, y: i32) -> bool {
    x >= 0 && y >= 0 && mask.get(x as usize, y as usize)
}

/// Collect directed boundary edges, clockwise around selected pixels (y down).
fn boundary_edges(mask: &Mask) -> Vec<(Vertex, Vertex)> {
    let mut edges = Vec::new();

    for y in 0..mask.height() as i32 {
        for x in 0..mask.width() as i32 {
            if !is_selected(mask, x, y) {
                continue;
            }
            if !is_selected(mask, x, y - 1) {
                edges.push(((x, y), (x + 1, y)));
            }
            if !is_selected(mask, x + 1, y) {
                edges.push(((x + 1, y), (x + 1, y + 1)));
            }
            if !is_selected(mask, x, y + 1) {
                edges.push(((x + 1, y + 1), (x, y + 1)));
            }
            if !is_selected(mask, x - 1, y) {
                edges.push(((x, y + 1), (x, y)));
            }
        }
    }

    edges
}

/// Trace every closed outline of the selection.
///
/// Each polygon lists only its corner vertices. Outer boundaries run
/// clockwise on screen, holes counter-clockwise.
pub fn trace_outlines(mask: &Mask) -> Vec<Vec<(f32, f32)>> {
    let edges = boundary_edges(mask);

    // Every vertex has equal in- and out-degree, so walking unused edges from
    // any start always returns to it.
    let mut outgoing: HashMap<Vertex, Vec<usize>> = HashMap::new();
    for (i, &(from, _)) in edges.iter().enumerate() {
        outgoing.entry(from).or_default().push(i);
    }

    let mut used = vec![false; edges.len()];
    let mut outlines = Vec::new();

    for start in 0..edges.len() {
        if used[start] {
            continue;
        }

        let mut path: Vec<Vertex> = Vec::new();
        let mut current = start;
        loop {
            used[current] = true;
            let (from, to) = edges[current];
            path.push(from);

            let next = outgoing
                .get(&to)
                .and_then(|candidates| candidates.iter().copied().find(|&e| !used[e]));
            match next {
                Some(e) if to != edges[start].0 => current = e,
                _ => break,
            }
        }

        outlines.push(corners(&path));
    }

    outlines
}

/// Drop vertices where the outline continues straight on.
fn corners(path: &[Vertex]) -> Vec<(f32, f32)> {
    let n = path.len();
    (0..n)
        .filter(|&i| {
            let prev = path[(i + n - 1) % n];
            let cur = path[i];
            let next = path[(i + 1) % n];
            let d1 = (cur.0 - prev.0, cur.1 - prev.1);
            let d2 = (next.0 - cur.0, next.1 - cur.1);
            d1 != d2
        })
        .map(|i| (path[i].0 as f32, path[i].1 as f32))
        .collect()
}
