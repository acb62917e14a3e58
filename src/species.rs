//! Groups of closely related genomes, and how each group breeds its share of the next generation.

use crate::{
    config::Coefficients,
    crossover::delta,
    error::NeatError,
    genome::NetworkChromosome,
    innovation::InnovationRegistry,
    mutation::Mutation,
    random::Happens,
};
use rand::{seq::IndexedRandom, Rng, RngCore};

/// Genomes within the compatibility threshold of a shared representative. The representative
/// is fixed at creation and only used to test compatibility.
#[derive(Debug, Clone)]
pub struct Species {
    representative: NetworkChromosome,
    members: Vec<NetworkChromosome>,
    shared: Vec<f64>,
}

impl Species {
    /// A species whose first member is its representative
    pub fn new(representative: NetworkChromosome) -> Self {
        Self {
            members: vec![representative.clone()],
            representative,
            shared: Vec::new(),
        }
    }

    #[inline]
    pub fn representative(&self) -> &NetworkChromosome {
        &self.representative
    }

    #[inline]
    pub fn members(&self) -> &[NetworkChromosome] {
        &self.members
    }

    /// Move every member out, leaving the species empty
    pub fn take_members(&mut self) -> Vec<NetworkChromosome> {
        self.shared.clear();
        std::mem::take(&mut self.members)
    }

    pub fn push(&mut self, genome: NetworkChromosome) {
        self.members.push(genome);
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.members.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    pub fn is_compatible(
        &self,
        genome: &NetworkChromosome,
        coefficients: &Coefficients,
        threshold: f64,
    ) -> bool {
        delta(
            self.representative.connections(),
            genome.connections(),
            coefficients,
        ) < threshold
    }

    /// Share each member's fitness with the rest of the species, returning the species total
    pub fn adjust_fitness(&mut self) -> f64 {
        let l = self.len() as f64;
        self.shared = self.members.iter().map(|m| m.fitness() / l).collect();
        self.adjusted_fitness()
    }

    /// Total shared fitness as of the last [Species::adjust_fitness]
    pub fn adjusted_fitness(&self) -> f64 {
        self.shared.iter().sum()
    }

    pub fn shared_fitness(&self) -> &[f64] {
        &self.shared
    }

    pub fn fittest(&self) -> Option<&NetworkChromosome> {
        self.members
            .iter()
            .max_by(|l, r| l.fitness().total_cmp(&r.fitness()))
    }

    /// Roulette over member fitness, negative fitness counting as 0. Uniform when nobody
    /// has any.
    pub fn select_parent(&self, rng: &mut impl RngCore) -> Option<&NetworkChromosome> {
        let total = self
            .members
            .iter()
            .map(|m| m.fitness().max(0.))
            .sum::<f64>();
        if !(total > 0. && total.is_finite()) {
            return self.random_member(rng);
        }

        let mut roll = rng.random::<f64>() * total;
        for member in &self.members {
            roll -= member.fitness().max(0.);
            if roll < 0. {
                return Some(member);
            }
        }
        self.members
            .iter()
            .rev()
            .find(|m| m.fitness() > 0.)
    }

    pub fn random_member(&self, rng: &mut impl RngCore) -> Option<&NetworkChromosome> {
        self.members.choose(rng)
    }

    /// Breed `quota` offspring: an unmutated copy of the fittest member, then mutated crossovers
    /// of roulette-selected parents
    pub fn reproduce(
        &self,
        quota: usize,
        mutation: &Mutation,
        registry: &mut InnovationRegistry,
        rng: &mut (impl RngCore + Happens),
    ) -> Result<Vec<NetworkChromosome>, NeatError> {
        let elite = self.fittest().ok_or(NeatError::EmptySpecies)?;
        if quota == 0 {
            return Ok(vec![]);
        }

        let mut offspring = Vec::with_capacity(quota);
        offspring.push(elite.clone());
        while offspring.len() < quota {
            let l = self.select_parent(rng).ok_or(NeatError::EmptySpecies)?;
            let r = self.select_parent(rng).ok_or(NeatError::EmptySpecies)?;
            let child = l.reproduce_with(r, rng)?;
            offspring.push(mutation.mutate(&child, rng, registry)?);
        }

        Ok(offspring)
    }
}
