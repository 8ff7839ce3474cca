///////////////////////////////////////////////////////////////
///////////////////// module: matching ////////////////////////
///////////////////////////////////////////////////////////////

/// Pairs up the representatives by increasing inter-representative distance.
///
/// All pairs are enumerated, sorted ascending by (distance, first index,
/// second index) and scanned greedily; a pair is taken when both ends are
/// still free. Representatives left over afterwards become singleton matches,
/// so every representative appears in exactly one match. With an odd |C'| the
/// greedy scan leaves exactly one representative unmatched; the singleton
/// list is kept general anyway.
use crate::instance::Instance;
use crate::types::{ClientIdx, Distance, RepIdx};

/// A matched pair of representatives, or a singleton for an unmatched one.
/// Indices refer to positions within the representative set. For a singleton
/// the distance is infinite.
#[derive(Debug, PartialEq)]
pub(crate) struct Match {
    pub first: RepIdx,
    pub second: Option<RepIdx>,
    pub dist: Distance,
}

pub(crate) fn match_representatives(
    instance: &Instance,
    representatives: &[ClientIdx],
) -> Vec<Match> {
    let m = representatives.len();

    let mut pairs: Vec<(Distance, RepIdx, RepIdx)> =
        Vec::with_capacity(m * m.saturating_sub(1) / 2);
    for a in 0..m {
        for b in (a + 1)..m {
            pairs.push((
                instance.client_dist(representatives[a], representatives[b]),
                a,
                b,
            ));
        }
    }
    pairs.sort_by(|p, q| {
        p.0.total_cmp(&q.0)
            .then(p.1.cmp(&q.1))
            .then(p.2.cmp(&q.2))
    });

    let mut matched = vec![false; m];
    let mut matches: Vec<Match> = Vec::with_capacity(m / 2 + 1);
    for &(dist, a, b) in pairs.iter() {
        if matched[a] || matched[b] {
            continue;
        }
        matched[a] = true;
        matched[b] = true;
        matches.push(Match {
            first: a,
            second: Some(b),
            dist,
        });
    }

    // leftovers get their own singleton match instead of being squeezed into
    // an existing entry
    for (r, &taken) in matched.iter().enumerate() {
        if !taken {
            matches.push(Match {
                first: r,
                second: None,
                dist: Distance::INFINITY,
            });
        }
    }

    matches
}
