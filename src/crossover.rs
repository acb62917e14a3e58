use crate::{
    config::Coefficients,
    error::NeatError,
    genome::{ConnectionGene, Layer, NetworkChromosome, NeuronGene, Role},
    random::{EvolutionEvent, Happens},
};
use core::cmp::Ordering;
use fxhash::{FxHashMap, FxHashSet};
use rand::RngCore;
use std::collections::BTreeMap;

fn by_innovation(connections: &[ConnectionGene]) -> FxHashMap<usize, &ConnectionGene> {
    connections.iter().map(|c| (c.innovation, c)).collect()
}

/// Merge two connection sets aligned by innovation id, where `l_fitness` is how `l` compares to
/// `r`. Genes only one parent carries come from the fitter one, `l` on a tie.
pub fn crossover(
    l: &[ConnectionGene],
    r: &[ConnectionGene],
    l_fitness: Ordering,
    rng: &mut (impl RngCore + Happens),
) -> Vec<ConnectionGene> {
    let l_fitter = l_fitness != Ordering::Less;
    let (l_map, r_map) = (by_innovation(l), by_innovation(r));

    let mut innovations = l_map
        .keys()
        .chain(r_map.keys())
        .copied()
        .collect::<FxHashSet<usize>>()
        .into_iter()
        .collect::<Vec<_>>();
    innovations.sort_unstable();

    let mut connections = Vec::with_capacity(innovations.len());
    for inno in innovations {
        match (l_map.get(&inno), r_map.get(&inno)) {
            (Some(l_conn), Some(r_conn)) => {
                let mut conn = if rng.happens(EvolutionEvent::PickLeft) {
                    (*l_conn).clone()
                } else {
                    (*r_conn).clone()
                };
                if l_conn.enabled != r_conn.enabled {
                    conn.enabled = !rng.happens(EvolutionEvent::KeepDisabled);
                }
                connections.push(conn);
            }
            (Some(l_conn), None) if l_fitter => connections.push((*l_conn).clone()),
            (None, Some(r_conn)) if !l_fitter => connections.push((*r_conn).clone()),
            _ => {}
        }
    }

    connections
}

/// Count of (disjoint, excess) genes. A gene only one side carries is excess when its id is past
/// the other side's highest id.
pub fn disjoint_excess_count(l: &[ConnectionGene], r: &[ConnectionGene]) -> (f64, f64) {
    let l_innos = l.iter().map(|c| c.innovation).collect::<FxHashSet<_>>();
    let r_innos = r.iter().map(|c| c.innovation).collect::<FxHashSet<_>>();
    let l_max = l_innos.iter().max().copied();
    let r_max = r_innos.iter().max().copied();

    let classify = |only: &FxHashSet<usize>, other: &FxHashSet<usize>, other_max: Option<usize>| {
        only.difference(other)
            .fold((0., 0.), |(disjoint, excess), inno| match other_max {
                Some(max) if *inno <= max => (disjoint + 1., excess),
                _ => (disjoint, excess + 1.),
            })
    };

    let (l_disjoint, l_excess) = classify(&l_innos, &r_innos, r_max);
    let (r_disjoint, r_excess) = classify(&r_innos, &l_innos, l_max);
    (l_disjoint + r_disjoint, l_excess + r_excess)
}

/// if genomes share no overlapping weights, their average diff should be 0
pub fn avg_weight_diff(l: &[ConnectionGene], r: &[ConnectionGene]) -> f64 {
    let (short, long) = match (l.len(), r.len()) {
        (0, _) | (_, 0) => return 0.,
        (l_len, r_len) if l_len < r_len => (l, r),
        _ => (r, l),
    };

    let s_weights = by_innovation(short);
    let (count, diff_sum) = long
        .iter()
        .filter_map(|l_conn| s_weights.get(&l_conn.innovation).map(|s| s.weight_diff(l_conn)))
        .fold((0., 0.), |(count, sum), diff| (count + 1., sum + diff));

    if count == 0. {
        0.
    } else {
        diff_sum / count
    }
}

/// Compatibility distance. Excess and disjoint counts are normalized by the raw size of the
/// larger connection set, never rounded up to 1 for small genomes.
pub fn delta(l: &[ConnectionGene], r: &[ConnectionGene], coefficients: &Coefficients) -> f64 {
    let n = l.len().max(r.len()) as f64;
    if n == 0. {
        return 0.;
    }

    let (disjoint, excess) = disjoint_excess_count(l, r);
    coefficients.excess * excess / n
        + coefficients.disjoint * disjoint / n
        + coefficients.weight * avg_weight_diff(l, r)
}

impl NetworkChromosome {
    /// Cross this genome (parent1) with `other` (parent2)
    pub fn reproduce_with(
        &self,
        other: &Self,
        rng: &mut (impl RngCore + Happens),
    ) -> Result<Self, NeatError> {
        let connections = crossover(
            self.connections(),
            other.connections(),
            self.fitness().total_cmp(&other.fitness()),
            rng,
        );

        let mut seen = FxHashSet::default();
        let mut layers: BTreeMap<Layer, Vec<NeuronGene>> = BTreeMap::new();
        for (layer, neuron) in self.neurons().chain(other.neurons()) {
            if seen.insert(neuron.id) {
                layers.entry(layer).or_default().push(*neuron);
            }
        }

        let has_bias = layers
            .values()
            .flatten()
            .any(|n| matches!(n.role, Role::Bias));
        if !has_bias {
            if let Some(max) = seen.iter().max() {
                layers
                    .entry(Layer::INPUT)
                    .or_default()
                    .insert(0, NeuronGene::bias(max + 1));
            }
        }

        NetworkChromosome::new(layers, connections)
    }
}
