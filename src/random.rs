use crate::constants::{
    NEAT_ADD_CONNECTION_ODDS, NEAT_ADD_NEURON_ODDS, NEAT_CROSSOVER_KEEP_DISABLED_PROB,
    NEAT_CROSSOVER_PICK_LEFT_PROB, NEAT_PERTURB_WEIGHTS_ODDS, NEAT_TOGGLE_CONNECTION_ODDS,
};
use rand::{rngs::StdRng, RngCore, SeedableRng};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EvolutionEvent {
    PerturbWeights,
    ToggleConnection,
    AddConnection,
    AddNeuron,
    KeepDisabled,
    PickLeft,
}

/// The four structural and parametric mutations, exactly one of which is applied per call
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MutationKind {
    PerturbWeights,
    ToggleConnection,
    AddConnection,
    AddNeuron,
}

impl MutationKind {
    pub const ALL: [MutationKind; 4] = [
        MutationKind::PerturbWeights,
        MutationKind::ToggleConnection,
        MutationKind::AddConnection,
        MutationKind::AddNeuron,
    ];

    pub fn event(self) -> EvolutionEvent {
        match self {
            Self::PerturbWeights => EvolutionEvent::PerturbWeights,
            Self::ToggleConnection => EvolutionEvent::ToggleConnection,
            Self::AddConnection => EvolutionEvent::AddConnection,
            Self::AddNeuron => EvolutionEvent::AddNeuron,
        }
    }
}

pub const fn percent(x: u64) -> u64 {
    x * (u64::MAX / 100)
}

pub trait Probabilities {
    type Update;
    fn probability(&self, evt: EvolutionEvent) -> u64;
    fn update(&mut self, stats: Self::Update);
}

pub trait Happens: RngCore + Probabilities {
    fn happens(&mut self, evt: EvolutionEvent) -> bool;

    /// Roll for a single mutation, weighting each kind by its probability relative to the sum of
    /// all four. Falls back to weight perturbation when every kind has zero odds.
    fn mutation_kind(&mut self) -> MutationKind {
        let odds = MutationKind::ALL.map(|kind| (kind, self.probability(kind.event())));
        let total = odds
            .iter()
            .fold(0u64, |acc, (_, p)| acc.saturating_add(*p));
        if total == 0 {
            return MutationKind::PerturbWeights;
        }

        let mut roll = self.next_u64() % total;
        for (kind, p) in odds {
            if roll < p {
                return kind;
            }
            roll -= p;
        }
        MutationKind::PerturbWeights
    }
}

impl<T: RngCore + Probabilities> Happens for T {
    fn happens(&mut self, evt: EvolutionEvent) -> bool {
        self.probability(evt) > self.next_u64()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProbStatic {
    perturb_weights: u64,
    toggle_connection: u64,
    add_connection: u64,
    add_neuron: u64,
    keep_disabled: u64,
    pick_left: u64,
}

impl ProbStatic {
    pub fn with_overrides(mut self, updates: &[(EvolutionEvent, u64)]) -> Self {
        for update in updates {
            self.update(*update);
        }
        self
    }
}

impl Default for ProbStatic {
    fn default() -> Self {
        Self {
            perturb_weights: NEAT_PERTURB_WEIGHTS_ODDS,
            toggle_connection: NEAT_TOGGLE_CONNECTION_ODDS,
            add_connection: NEAT_ADD_CONNECTION_ODDS,
            add_neuron: NEAT_ADD_NEURON_ODDS,
            keep_disabled: NEAT_CROSSOVER_KEEP_DISABLED_PROB,
            pick_left: NEAT_CROSSOVER_PICK_LEFT_PROB,
        }
    }
}

impl Probabilities for ProbStatic {
    type Update = (EvolutionEvent, u64);
    fn probability(&self, evt: EvolutionEvent) -> u64 {
        match evt {
            EvolutionEvent::PerturbWeights => self.perturb_weights,
            EvolutionEvent::ToggleConnection => self.toggle_connection,
            EvolutionEvent::AddConnection => self.add_connection,
            EvolutionEvent::AddNeuron => self.add_neuron,
            EvolutionEvent::KeepDisabled => self.keep_disabled,
            EvolutionEvent::PickLeft => self.pick_left,
        }
    }

    fn update(&mut self, (evt, v): Self::Update) {
        match evt {
            EvolutionEvent::PerturbWeights => self.perturb_weights = v,
            EvolutionEvent::ToggleConnection => self.toggle_connection = v,
            EvolutionEvent::AddConnection => self.add_connection = v,
            EvolutionEvent::AddNeuron => self.add_neuron = v,
            EvolutionEvent::KeepDisabled => self.keep_disabled = v,
            EvolutionEvent::PickLeft => self.pick_left = v,
        }
    }
}

/// A probability table bound to a source of randomness, so that operators can take a single
/// `&mut (impl RngCore + Happens)`
pub struct ProbBinding<P: Probabilities, R: RngCore> {
    p: P,
    r: R,
}

impl<P: Probabilities, R: RngCore> ProbBinding<P, R> {
    pub fn new(p: P, r: R) -> Self {
        Self { p, r }
    }
}

impl<P: Probabilities, R: RngCore> Probabilities for ProbBinding<P, R> {
    type Update = P::Update;
    fn probability(&self, evt: EvolutionEvent) -> u64 {
        self.p.probability(evt)
    }

    fn update(&mut self, stats: Self::Update) {
        self.p.update(stats);
    }
}

impl<P: Probabilities, R: RngCore> RngCore for ProbBinding<P, R> {
    fn next_u32(&mut self) -> u32 {
        self.r.next_u32()
    }

    fn next_u64(&mut self) -> u64 {
        self.r.next_u64()
    }

    fn fill_bytes(&mut self, dest: &mut [u8]) {
        self.r.fill_bytes(dest)
    }
}

pub fn default_rng() -> StdRng {
    StdRng::from_os_rng()
}
