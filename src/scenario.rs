//! The boundary between evolution and the task being solved.

use crate::{error::NeatError, genome::NetworkChromosome, species::Species};
use core::ops::ControlFlow;

/// Something an [Environment] can query and score
pub trait Agent {
    fn output(&self, input: &[f64]) -> Result<Vec<f64>, NeatError>;
    fn fitness(&self) -> f64;
    fn set_fitness(&mut self, fitness: f64);
}

impl Agent for NetworkChromosome {
    fn output(&self, input: &[f64]) -> Result<Vec<f64>, NeatError> {
        self.evaluate(input)
    }

    fn fitness(&self) -> f64 {
        NetworkChromosome::fitness(self)
    }

    fn set_fitness(&mut self, fitness: f64) {
        NetworkChromosome::set_fitness(self, fitness)
    }
}

/// A task genomes are evolved against
pub trait Environment {
    /// input width of every agent
    fn state_size(&self) -> usize;

    /// output width of every agent
    fn action_size(&self) -> usize;

    fn evaluate(&mut self, agent: &impl Agent) -> f64;

    fn solved(&mut self, agent: &impl Agent) -> bool;

    /// Called before every evaluation, for tasks that carry state between them
    fn reset(&mut self) {}
}

/// A view of a generation once it has been speciated
#[derive(Debug)]
pub struct Stats<'a> {
    pub generation: usize,
    pub threshold: f64,
    pub species: &'a [Species],
}

impl Stats<'_> {
    pub fn fittest(&self) -> Option<&NetworkChromosome> {
        self.species
            .iter()
            .filter_map(Species::fittest)
            .max_by(|l, r| l.fitness().total_cmp(&r.fitness()))
    }

    pub fn any_fitter_than(&self, target: f64) -> bool {
        self.species
            .iter()
            .flat_map(Species::members)
            .any(|m| m.fitness() > target)
    }

    pub fn population(&self) -> usize {
        self.species.iter().map(Species::len).sum()
    }
}

pub type Hook = Box<dyn FnMut(&mut Stats<'_>) -> ControlFlow<()>>;

/// Callbacks run once per generation. Any of them breaking ends the run.
#[derive(Default)]
pub struct EvolutionHooks(Vec<Hook>);

impl EvolutionHooks {
    pub fn new(hooks: Vec<Hook>) -> Self {
        Self(hooks)
    }

    pub fn fire(&mut self, mut stats: Stats<'_>) -> ControlFlow<()> {
        for hook in self.0.iter_mut() {
            hook(&mut stats)?;
        }
        ControlFlow::Continue(())
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::{genome::test::two_one, innovation::InnovationRegistry};

    fn species(fitness: &[f64]) -> Vec<Species> {
        let mut registry = InnovationRegistry::new();
        fitness
            .iter()
            .map(|f| {
                let mut genome = two_one(&mut registry);
                genome.set_fitness(*f);
                Species::new(genome)
            })
            .collect()
    }

    #[test]
    fn test_agent() {
        let mut genome = two_one(&mut InnovationRegistry::new());
        Agent::set_fitness(&mut genome, 1.5);
        assert_eq!(Agent::fitness(&genome), 1.5);
        assert_eq!(genome.output(&[1., 0.]).unwrap(), genome.evaluate(&[1., 0.]).unwrap());
        assert!(genome.output(&[1.]).is_err());
    }

    #[test]
    fn test_stats() {
        let species = species(&[1., 7., -2.]);
        let stats = Stats {
            generation: 3,
            threshold: 3.,
            species: &species,
        };
        assert_eq!(stats.fittest().unwrap().fitness(), 7.);
        assert!(stats.any_fitter_than(6.9));
        assert!(!stats.any_fitter_than(7.));
        assert_eq!(stats.population(), 3);

        let empty = Stats {
            generation: 0,
            threshold: 3.,
            species: &[],
        };
        assert!(empty.fittest().is_none());
    }

    #[test]
    fn test_hooks_break() {
        let species = species(&[1.]);
        let mut calls = 0;
        let stop: Hook = Box::new(|s: &mut Stats<'_>| {
            if s.generation >= 2 {
                ControlFlow::Break(())
            } else {
                ControlFlow::Continue(())
            }
        });
        // never reached once the first hook breaks
        let count: Hook = Box::new(move |_: &mut Stats<'_>| {
            calls += 1;
            assert!(calls <= 2);
            ControlFlow::Continue(())
        });
        let mut hooks = EvolutionHooks::new(vec![stop, count]);

        for generation in 0..2 {
            let stats = Stats {
                generation,
                threshold: 3.,
                species: &species,
            };
            assert!(hooks.fire(stats).is_continue());
        }
        let stats = Stats {
            generation: 2,
            threshold: 3.,
            species: &species,
        };
        assert!(hooks.fire(stats).is_break());
    }
}
