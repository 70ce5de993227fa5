//! Ground-truth overlap evaluation.
//!
//! Compares two ranked neighbor lists per query and reports the fraction of
//! the candidate's top-`at` entries that hit the reference's top-`at` set,
//! averaged over queries. When `match_on_distance` is set, a candidate that
//! misses on id still hits if its distance is bit-exactly equal to the
//! reference distance at the same rank. That covers distinct points lying at
//! identical distances, where either is an acceptable answer.

use std::collections::HashSet;

use serde::Serialize;

use crate::error::{GtError, GtResult};
use crate::formats::GroundTruth;

/// Checks that two ground truths describe the same query set shape.
pub fn ensure_same_shape(gt1: &GroundTruth, gt2: &GroundTruth) -> GtResult<()> {
    if gt1.nq() != gt2.nq() || gt1.k() != gt2.k() {
        return Err(GtError::ShapeMismatch {
            nq1: gt1.nq(),
            k1: gt1.k(),
            nq2: gt2.nq(),
            k2: gt2.k(),
        });
    }
    Ok(())
}

/// Computes Overlap@`at` between a reference and a candidate ground truth.
///
/// For each query, the reference prefix `reference.ids[i, 0..at]` is taken
/// as a set (duplicate ids collapse), and each candidate entry
/// `candidate.ids[i, k]` for `k < at` counts one hit if its id is in that
/// set, or, with `match_on_distance`, if the two distance entries at rank
/// `k` compare equal. The result is `hits / (nq * at)`.
///
/// Duplicate ids in the reference prefix shrink the set but never the
/// denominator; a per-query score can exceed what distinct-id recall would
/// give. That matches the producing pipeline and must not be "corrected".
///
/// An empty query set scores 0.0. Cut-offs outside `1..=K` and mismatched
/// shapes are rejected; with validated inputs the evaluator cannot fail.
pub fn overlap_at(
    reference: &GroundTruth,
    candidate: &GroundTruth,
    at: usize,
    match_on_distance: bool,
) -> GtResult<f32> {
    ensure_same_shape(reference, candidate)?;
    let k = reference.k();
    if at == 0 || at > k {
        return Err(GtError::CutoffOutOfRange { at, k });
    }

    let nq = reference.nq();
    if nq == 0 {
        return Ok(0.0);
    }

    let mut hits: usize = 0;
    let mut prefix: HashSet<u32> = HashSet::with_capacity(at);
    for i in 0..nq {
        prefix.clear();
        prefix.extend(&reference.ids_row(i)[..at]);

        let cand_ids = &candidate.ids_row(i)[..at];
        let ref_dists = &reference.dists_row(i)[..at];
        let cand_dists = &candidate.dists_row(i)[..at];

        for rank in 0..at {
            if prefix.contains(&cand_ids[rank]) {
                hits += 1;
            } else if match_on_distance && ref_dists[rank] == cand_dists[rank] {
                hits += 1;
            }
        }
    }

    Ok(hits as f32 / (nq * at) as f32)
}

/// One `(at, score)` row of an overlap report.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct OverlapEntry {
    pub at: usize,
    pub score: f32,
}

/// Overlap scores for a list of cut-offs, in output order.
///
/// User-supplied cut-offs come first, in the order given; the final entry
/// is always Overlap@K.
#[derive(Debug, Clone, Serialize)]
pub struct OverlapReport {
    pub nq: usize,
    pub k: usize,
    pub match_on_distance: bool,
    pub entries: Vec<OverlapEntry>,
}

/// Evaluates every requested cut-off plus the implicit Overlap@K.
pub fn compute_report(
    reference: &GroundTruth,
    candidate: &GroundTruth,
    cutoffs: &[usize],
    match_on_distance: bool,
) -> GtResult<OverlapReport> {
    ensure_same_shape(reference, candidate)?;

    let k = reference.k();
    let mut entries = Vec::with_capacity(cutoffs.len() + 1);
    for &at in cutoffs {
        let score = overlap_at(reference, candidate, at, match_on_distance)?;
        entries.push(OverlapEntry { at, score });
    }
    let score = overlap_at(reference, candidate, k, match_on_distance)?;
    entries.push(OverlapEntry { at: k, score });

    Ok(OverlapReport {
        nq: reference.nq(),
        k,
        match_on_distance,
        entries,
    })
}
