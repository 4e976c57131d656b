//! Circle eraser for drawn polylines
//!
//! Every segment is intersected with the eraser circle in the local frame.
//! Sub-segments whose midpoint falls inside the circle (distance <= radius)
//! are removed, splitting the polyline into the surviving pieces.

use super::projection::{LocalFrame, Vec2};
use super::{EraseRegion, LatLng, Polyline};

/// Crossings this close to a segment endpoint are ignored
const T_EPSILON: f64 = 0.001;
/// Segments with a squared length at or below this are degenerate
const DEGENERATE_LEN_SQ: f64 = 1e-9;

#[derive(Debug, thiserror::Error)]
pub enum EraseError {
    #[error("eraser center or radius is not finite")]
    InvalidRegion,

    #[error("non-finite coordinate in polyline {line} near vertex {vertex}")]
    NonFinite { line: usize, vertex: usize },
}

/// Remove the eraser circle from every polyline.
///
/// Never fails: on any numeric problem the input is returned unchanged.
pub fn erase_circle_from_polylines(region: &EraseRegion, polylines: &[Polyline]) -> Vec<Polyline> {
    match try_erase(region, polylines) {
        Ok(erased) => erased,
        Err(e) => {
            tracing::warn!(error = %e, "circle erase failed, keeping polylines unchanged");
            polylines.to_vec()
        }
    }
}

/// Erase from an optional polyline list; a missing list erases to nothing
pub fn erase_optional(region: &EraseRegion, polylines: Option<&[Polyline]>) -> Vec<Polyline> {
    polylines.map_or_else(Vec::new, |lines| erase_circle_from_polylines(region, lines))
}

fn try_erase(region: &EraseRegion, polylines: &[Polyline]) -> Result<Vec<Polyline>, EraseError> {
    if !region.center.is_finite() || !region.radius_meters.is_finite() {
        return Err(EraseError::InvalidRegion);
    }

    let frame = LocalFrame::new(region.center);
    let r2 = region.radius_meters * region.radius_meters;

    let mut out = Vec::new();
    for (line_index, line) in polylines.iter().enumerate() {
        if line.len() < 2 {
            continue;
        }
        let pieces = erase_line(&frame, r2, line).map_err(|vertex| EraseError::NonFinite {
            line: line_index,
            vertex,
        })?;
        out.extend(pieces.into_iter().filter(|piece| piece.len() >= 2));
    }
    Ok(out)
}

/// Inside test used for both endpoints and sub-segment midpoints
pub(crate) fn is_inside(point: Vec2, r2: f64) -> bool {
    point.norm_sq() <= r2
}

/// Parameters in `(T_EPSILON, 1 - T_EPSILON)` where `a + t*v` meets the circle, ascending
fn crossings(a: Vec2, v: Vec2, r2: f64) -> Vec<f64> {
    let qa = v.dot(v);
    if qa <= DEGENERATE_LEN_SQ {
        return Vec::new();
    }
    let qb = 2.0 * a.dot(v);
    let qc = a.norm_sq() - r2;
    let delta = qb * qb - 4.0 * qa * qc;
    if delta < 0.0 {
        return Vec::new();
    }

    let root = delta.sqrt();
    let mut ts: Vec<f64> = [(-qb - root) / (2.0 * qa), (-qb + root) / (2.0 * qa)]
        .into_iter()
        .filter(|t| *t > T_EPSILON && *t < 1.0 - T_EPSILON)
        .collect();
    ts.sort_by(f64::total_cmp);
    ts
}

/// Erase one polyline. The error is the index of the offending vertex.
fn erase_line(frame: &LocalFrame, r2: f64, line: &[LatLng]) -> Result<Vec<Polyline>, usize> {
    let mut pieces: Vec<Polyline> = Vec::new();
    let mut current: Polyline = Vec::new();

    let flush = |current: &mut Polyline, pieces: &mut Vec<Polyline>| {
        if !current.is_empty() {
            pieces.push(std::mem::take(current));
        }
    };

    for (i, pair) in line.windows(2).enumerate() {
        let (p1, p2) = (pair[0], pair[1]);
        let a = frame.to_local(p1);
        let b = frame.to_local(p2);
        if !a.is_finite() {
            return Err(i);
        }
        if !b.is_finite() {
            return Err(i + 1);
        }

        let a_inside = is_inside(a, r2);
        let b_inside = is_inside(b, r2);
        if current.is_empty() && !a_inside {
            current.push(p1);
        }

        let v = b.sub(a);
        let ts = crossings(a, v, r2);

        if ts.is_empty() {
            match (a_inside, b_inside) {
                (false, false) => current.push(p2),
                (true, true) => flush(&mut current, &mut pieces),
                (true, false) => {
                    tracing::warn!(segment = i, "segment leaves eraser without a crossing");
                    flush(&mut current, &mut pieces);
                    current = vec![p2];
                }
                (false, true) => {
                    tracing::warn!(segment = i, "segment enters eraser without a crossing");
                    flush(&mut current, &mut pieces);
                }
            }
            continue;
        }

        let mut bounds = Vec::with_capacity(ts.len() + 2);
        bounds.push(0.0);
        bounds.extend(ts);
        bounds.push(1.0);
        let last = bounds.len() - 2;

        for (k, window) in bounds.windows(2).enumerate() {
            let (t_start, t_end) = (window[0], window[1]);
            let mid = a.along(v, (t_start + t_end) / 2.0);
            if is_inside(mid, r2) {
                flush(&mut current, &mut pieces);
                continue;
            }

            if k > 0 {
                current.push(checked(frame.to_lat_lng(a.along(v, t_start)), i)?);
            }
            if k < last {
                current.push(checked(frame.to_lat_lng(a.along(v, t_end)), i)?);
            } else {
                current.push(p2);
            }
        }
    }

    flush(&mut current, &mut pieces);
    Ok(pieces)
}

fn checked(point: LatLng, vertex: usize) -> Result<LatLng, usize> {
    if point.is_finite() {
        Ok(point)
    } else {
        Err(vertex)
    }
}
