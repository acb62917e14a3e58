//! The generational loop: evaluate, speciate, steer the threshold, reproduce.

use crate::{
    config::NeatConfig,
    error::NeatError,
    generator::NetworkGenerator,
    genome::NetworkChromosome,
    innovation::InnovationRegistry,
    mutation::Mutation,
    random::{ProbBinding, ProbStatic},
    scenario::{Environment, EvolutionHooks, Stats},
    species::Species,
};
use core::ops::ControlFlow;
use rand::{seq::IteratorRandom, RngCore};
use tracing::{info, trace, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Initializing,
    Evaluating,
    Speciating,
    AdjustingThreshold,
    Reproducing,
    Terminated,
}

/// A single evolutionary run. Owns the population and the innovation registry every operator in
/// the run shares.
pub struct Neat<R: RngCore> {
    config: NeatConfig,
    rng: ProbBinding<ProbStatic, R>,
    registry: InnovationRegistry,
    mutation: Mutation,
    population: Vec<NetworkChromosome>,
    species: Vec<Species>,
    threshold: f64,
    generation: usize,
    phase: Phase,
}

impl<R: RngCore> Neat<R> {
    pub fn new(config: NeatConfig, rng: R) -> Result<Self, NeatError> {
        config.validate()?;
        Ok(Self {
            rng: ProbBinding::new(config.probabilities.clone(), rng),
            registry: InnovationRegistry::new(),
            mutation: Mutation::new(&config.mutation)?,
            population: Vec::new(),
            species: Vec::new(),
            threshold: config
                .speciation
                .clamp_threshold(config.speciation.initial_threshold),
            generation: 0,
            phase: Phase::Initializing,
            config,
        })
    }

    pub fn config(&self) -> &NeatConfig {
        &self.config
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn generation(&self) -> usize {
        self.generation
    }

    pub fn threshold(&self) -> f64 {
        self.threshold
    }

    pub fn species(&self) -> &[Species] {
        &self.species
    }

    /// Genomes awaiting evaluation. Empty between speciation and reproduction, when every genome
    /// lives in a species.
    pub fn population(&self) -> &[NetworkChromosome] {
        &self.population
    }

    pub fn registry(&self) -> &InnovationRegistry {
        &self.registry
    }

    /// Fittest genome alive, whether still unspeciated or already in a species
    pub fn fittest(&self) -> Option<&NetworkChromosome> {
        self.population
            .iter()
            .chain(self.species.iter().flat_map(Species::members))
            .max_by(|l, r| l.fitness().total_cmp(&r.fitness()))
    }

    /// Seed a fresh population sized for `env`, restarting the generation count
    pub fn initialize(&mut self, env: &impl Environment) {
        self.phase = Phase::Initializing;
        let generator = NetworkGenerator::new(env.state_size(), env.action_size());
        self.population = (0..self.config.population_size)
            .map(|_| generator.generate(&mut self.registry, &mut self.rng))
            .collect();
        self.species.clear();
        self.generation = 0;
    }

    pub fn evaluate(&mut self, env: &mut impl Environment) {
        self.phase = Phase::Evaluating;
        for genome in self.population.iter_mut() {
            env.reset();
            let fitness = env.evaluate(&*genome);
            genome.set_fitness(fitness);
        }
    }

    /// Whether the run is over, because the fittest genome solves `env` or the generation
    /// budget is spent
    pub fn is_done(&self, env: &mut impl Environment) -> Result<bool, NeatError> {
        let best = self.fittest().ok_or(NeatError::EmptyPopulation)?;
        Ok(env.solved(best) || self.generation >= self.config.max_generations)
    }

    /// Sort the population into species from scratch. Each genome joins the first species it is
    /// compatible with, or founds a new one.
    pub fn speciate(&mut self) {
        self.phase = Phase::Speciating;
        let coefficients = self.config.speciation.coefficients;
        let genomes = self
            .population
            .drain(..)
            .chain(self.species.iter_mut().flat_map(Species::take_members))
            .collect::<Vec<_>>();

        let mut species: Vec<Species> = Vec::new();
        for genome in genomes {
            match species
                .iter_mut()
                .find(|s| s.is_compatible(&genome, &coefficients, self.threshold))
            {
                Some(s) => s.push(genome),
                None => {
                    trace!(
                        generation = self.generation,
                        index = species.len(),
                        "new species"
                    );
                    species.push(Species::new(genome));
                }
            }
        }
        self.species = species;
    }

    /// Nudge the threshold one step towards the target species count
    pub fn adjust_threshold(&mut self) {
        self.phase = Phase::AdjustingThreshold;
        let speciation = &self.config.speciation;
        let count = self.species.len();
        if count < speciation.target_species {
            self.threshold -= speciation.threshold_step;
        } else if count > speciation.target_species {
            self.threshold += speciation.threshold_step;
        }
        self.threshold = speciation.clamp_threshold(self.threshold);
    }

    /// Replace the speciated generation with the next one. Each species breeds a share
    /// proportional to its adjusted fitness, and the rounding shortfall is made up of copies of
    /// random survivors.
    pub fn reproduce(&mut self) -> Result<(), NeatError> {
        self.phase = Phase::Reproducing;
        self.species.retain(|s| !s.is_empty());
        if self.species.is_empty() {
            return Err(NeatError::EmptyPopulation);
        }

        let target = self.config.population_size;
        let totals = self
            .species
            .iter_mut()
            .map(|s| s.adjust_fitness().max(0.))
            .collect::<Vec<_>>();
        let quotas = quotas(&totals, target);

        let mut next = Vec::with_capacity(target);
        for (species, quota) in self.species.iter().zip(quotas) {
            next.extend(species.reproduce(
                quota,
                &self.mutation,
                &mut self.registry,
                &mut self.rng,
            )?);
        }

        let shortfall = target.saturating_sub(next.len());
        for _ in 0..shortfall {
            let survivor = self
                .species
                .iter()
                .flat_map(Species::members)
                .choose(&mut self.rng)
                .ok_or(NeatError::EmptyPopulation)?;
            next.push(survivor.clone());
        }
        next.truncate(target);

        self.population = next;
        self.species.clear();
        Ok(())
    }

    pub fn solve(&mut self, env: &mut impl Environment) -> Result<NetworkChromosome, NeatError> {
        self.solve_with_hooks(env, EvolutionHooks::default())
    }

    /// Evolve against `env` until it is solved, the generation budget runs out, or a hook
    /// breaks. Returns the fittest genome of the final generation.
    pub fn solve_with_hooks(
        &mut self,
        env: &mut impl Environment,
        mut hooks: EvolutionHooks,
    ) -> Result<NetworkChromosome, NeatError> {
        self.initialize(env);
        loop {
            self.evaluate(env);
            if self.is_done(env)? {
                break;
            }

            self.speciate();
            self.adjust_threshold();
            info!(
                generation = self.generation,
                species = self.species.len(),
                threshold = self.threshold,
                fittest = self.fittest().map(NetworkChromosome::fitness),
                "generation evaluated"
            );

            let stats = Stats {
                generation: self.generation,
                threshold: self.threshold,
                species: &self.species,
            };
            if let ControlFlow::Break(()) = hooks.fire(stats) {
                break;
            }

            self.reproduce()?;
            self.generation += 1;
        }

        self.phase = Phase::Terminated;
        self.fittest().cloned().ok_or(NeatError::EmptyPopulation)
    }
}

/// Offspring owed to each species, proportional to its adjusted fitness and floored. Without any
/// positive fitness to go by the target is split evenly, the remainder going one apiece to the
/// earliest species.
fn quotas(totals: &[f64], target: usize) -> Vec<usize> {
    let sum = totals.iter().sum::<f64>();
    if sum > 0. && sum.is_finite() {
        return totals
            .iter()
            .map(|t| (t / sum * target as f64).floor() as usize)
            .collect();
    }

    warn!(sum, "no positive adjusted fitness, splitting offspring evenly");
    let (share, extra) = match totals.len() {
        0 => (0, 0),
        n => (target / n, target % n),
    };
    (0..totals.len())
        .map(|i| share + usize::from(i < extra))
        .collect()
}
