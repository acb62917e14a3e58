pub mod connection;
pub mod neuron;

pub use connection::ConnectionGene;
pub use neuron::{Activation, NeuronGene, Role};

use crate::{
    error::NeatError,
    serialize::{deserialize_layers, serialize_layers},
};
use core::cmp::Ordering;
use fxhash::{FxHashMap, FxHashSet};
use serde::{Deserialize, Serialize};
use std::{collections::BTreeMap, fs, path::Path};

/// Position of a neuron along the feed-forward axis, 0 for inputs and 1 for outputs
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Layer(f64);

impl Layer {
    pub const INPUT: Layer = Layer(0.);
    pub const OUTPUT: Layer = Layer(1.);

    pub fn new(x: f64) -> Self {
        Self(x)
    }

    #[inline]
    pub fn get(self) -> f64 {
        self.0
    }

    /// midpoint between two layers
    #[inline]
    pub fn between(self, other: Layer) -> Layer {
        Layer((self.0 + other.0) / 2.)
    }
}

impl Ord for Layer {
    fn cmp(&self, other: &Self) -> Ordering {
        self.0.total_cmp(&other.0)
    }
}

impl PartialOrd for Layer {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for Layer {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Layer {}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NetworkChromosome {
    #[serde(
        serialize_with = "serialize_layers",
        deserialize_with = "deserialize_layers"
    )]
    layers: BTreeMap<Layer, Vec<NeuronGene>>,
    connections: Vec<ConnectionGene>,
    #[serde(default)]
    fitness: f64,
}

impl NetworkChromosome {
    /// A genome from explicit parts, rejected if any connection points outside of `layers`
    pub fn new(
        layers: BTreeMap<Layer, Vec<NeuronGene>>,
        connections: Vec<ConnectionGene>,
    ) -> Result<Self, NeatError> {
        let genome = Self {
            layers,
            connections,
            fitness: 0.,
        };
        genome.check_consistency()?;
        Ok(genome)
    }

    pub fn layers(&self) -> &BTreeMap<Layer, Vec<NeuronGene>> {
        &self.layers
    }

    /// Every neuron with its layer, in ascending layer then declaration order
    pub fn neurons(&self) -> impl Iterator<Item = (Layer, &NeuronGene)> {
        self.layers
            .iter()
            .flat_map(|(layer, neurons)| neurons.iter().map(move |n| (*layer, n)))
    }

    pub fn neuron_count(&self) -> usize {
        self.layers.values().map(Vec::len).sum()
    }

    pub fn input_count(&self) -> usize {
        self.neurons()
            .filter(|(_, n)| matches!(n.role, Role::Input))
            .count()
    }

    pub fn output_count(&self) -> usize {
        self.neurons()
            .filter(|(_, n)| matches!(n.role, Role::Output))
            .count()
    }

    pub fn layer_of(&self, id: usize) -> Option<Layer> {
        self.neuron(id).map(|(layer, _)| layer)
    }

    pub fn neuron(&self, id: usize) -> Option<(Layer, &NeuronGene)> {
        self.neurons().find(|(_, n)| n.id == id)
    }

    pub fn contains_neuron(&self, id: usize) -> bool {
        self.neuron(id).is_some()
    }

    pub fn max_neuron_id(&self) -> Option<usize> {
        self.neurons().map(|(_, n)| n.id).max()
    }

    pub fn push_neuron(&mut self, layer: Layer, neuron: NeuronGene) {
        self.layers.entry(layer).or_default().push(neuron);
    }

    pub fn connections(&self) -> &[ConnectionGene] {
        &self.connections
    }

    pub fn connections_mut(&mut self) -> &mut [ConnectionGene] {
        &mut self.connections
    }

    pub fn push_connection(&mut self, connection: ConnectionGene) {
        self.connections.push(connection);
    }

    /// Push 2 connections onto the genome, first then second, as produced by a bisection
    pub fn push_2_connections(&mut self, first: ConnectionGene, second: ConnectionGene) {
        self.connections.reserve(2);
        self.connections.push(first);
        self.connections.push(second);
    }

    pub fn is_connected(&self, source: usize, target: usize) -> bool {
        self.connections
            .iter()
            .any(|c| c.source == source && c.target == target)
    }

    pub fn max_innovation(&self) -> Option<usize> {
        self.connections.iter().map(|c| c.innovation).max()
    }

    #[inline]
    pub fn fitness(&self) -> f64 {
        self.fitness
    }

    #[inline]
    pub fn set_fitness(&mut self, fitness: f64) {
        self.fitness = fitness;
    }

    /// Copy of this genome with its fitness cleared, the starting point for any offspring
    pub fn offspring(&self) -> Self {
        Self {
            layers: self.layers.clone(),
            connections: self.connections.clone(),
            fitness: 0.,
        }
    }

    /// Every connection endpoint must name a neuron placed in some layer
    pub fn check_consistency(&self) -> Result<(), NeatError> {
        let ids = self
            .neurons()
            .map(|(_, n)| n.id)
            .collect::<FxHashSet<usize>>();
        match self
            .connections
            .iter()
            .flat_map(|c| [c.source, c.target])
            .find(|id| !ids.contains(id))
        {
            Some(neuron) => Err(NeatError::InconsistentGenome { neuron }),
            None => Ok(()),
        }
    }

    /// Feed `input` forward through the network, returning one value per output neuron
    pub fn evaluate(&self, input: &[f64]) -> Result<Vec<f64>, NeatError> {
        let expected = self.input_count();
        if input.len() != expected {
            return Err(NeatError::InvalidInputSize {
                expected,
                actual: input.len(),
            });
        }

        let mut incoming: FxHashMap<usize, Vec<&ConnectionGene>> = FxHashMap::default();
        for conn in self.connections.iter().filter(|c| c.enabled) {
            incoming.entry(conn.target).or_default().push(conn);
        }

        let mut values: FxHashMap<usize, f64> = FxHashMap::default();
        values.reserve(self.neuron_count());
        self.neurons()
            .filter(|(_, n)| matches!(n.role, Role::Input))
            .zip(input)
            .for_each(|((_, n), v)| {
                values.insert(n.id, *v);
            });
        self.neurons()
            .filter(|(_, n)| matches!(n.role, Role::Bias))
            .for_each(|(_, n)| {
                values.insert(n.id, 1.);
            });

        for (_, neuron) in self.neurons().filter(|(_, n)| !n.is_sensory()) {
            let sum = match incoming.get(&neuron.id) {
                None => 0.,
                Some(conns) => conns.iter().try_fold(0., |acc, c| {
                    values
                        .get(&c.source)
                        .map(|v| acc + v * c.weight)
                        .ok_or(NeatError::InconsistentGenome { neuron: c.source })
                })?,
            };
            values.insert(neuron.id, neuron.activation.apply(sum));
        }

        self.neurons()
            .filter(|(_, n)| matches!(n.role, Role::Output))
            .map(|(_, n)| {
                values
                    .get(&n.id)
                    .copied()
                    .ok_or(NeatError::InconsistentGenome { neuron: n.id })
            })
            .collect()
    }

    pub fn to_string(&self) -> Result<String, NeatError> {
        Ok(serde_json::to_string(self)?)
    }

    #[allow(clippy::should_implement_trait)]
    pub fn from_str(s: &str) -> Result<Self, NeatError> {
        let genome: Self = serde_json::from_str(s)?;
        genome.check_consistency()?;
        Ok(genome)
    }

    pub fn to_file<P: AsRef<Path>>(&self, path: P) -> Result<(), NeatError> {
        fs::write(path, self.to_string()?)?;
        Ok(())
    }

    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, NeatError> {
        Self::from_str(&fs::read_to_string(path)?)
    }
}

#[cfg(test)]
pub(crate) mod test {
    use super::*;
    use crate::innovation::InnovationRegistry;
    use approx::assert_relative_eq;

    /// bias 2, inputs 0 1, output 3, every sensory neuron wired to the output at weight 1
    pub(crate) fn two_one(registry: &mut InnovationRegistry) -> NetworkChromosome {
        let mut layers = BTreeMap::new();
        layers.insert(
            Layer::INPUT,
            vec![
                NeuronGene::bias(2),
                NeuronGene::input(0),
                NeuronGene::input(1),
            ],
        );
        layers.insert(Layer::OUTPUT, vec![NeuronGene::output(3)]);
        let connections = [2, 0, 1]
            .into_iter()
            .map(|source| ConnectionGene::new(source, 3, 1., registry))
            .collect();
        NetworkChromosome::new(layers, connections).unwrap()
    }

    #[test]
    fn test_layer_order() {
        let mut layers = [Layer::OUTPUT, Layer::new(0.25), Layer::INPUT, Layer::new(0.5)];
        layers.sort();
        assert_eq!(
            layers.map(Layer::get),
            [0., 0.25, 0.5, 1.]
        );
        assert_eq!(Layer::INPUT.between(Layer::OUTPUT), Layer::new(0.5));
        assert_eq!(Layer::new(0.5).between(Layer::OUTPUT).get(), 0.75);
    }

    #[test]
    fn test_evaluate_sigmoid() {
        let genome = two_one(&mut InnovationRegistry::new());
        let out = genome.evaluate(&[1., 0.]).unwrap();
        assert_eq!(out.len(), 1);
        assert_relative_eq!(out[0], 0.8807970779778823);
        assert_relative_eq!(out[0], 0.8808, epsilon = 1e-4);
    }

    #[test]
    fn test_evaluate_deterministic() {
        let genome = two_one(&mut InnovationRegistry::new());
        let first = genome.evaluate(&[0.3, -0.9]).unwrap();
        for _ in 0..10 {
            assert_eq!(genome.evaluate(&[0.3, -0.9]).unwrap(), first);
        }
    }

    #[test]
    fn test_evaluate_skips_disabled() {
        let mut genome = two_one(&mut InnovationRegistry::new());
        genome.connections_mut().iter_mut().for_each(|c| c.enabled = false);
        assert_relative_eq!(genome.evaluate(&[1., 1.]).unwrap()[0], 0.5);
    }

    #[test]
    fn test_evaluate_hidden() {
        let mut registry = InnovationRegistry::new();
        let mut genome = two_one(&mut registry);
        let (l, r) = genome.connections_mut()[1].bisect(4, &mut registry);
        genome.push_neuron(Layer::new(0.5), NeuronGene::hidden(4, Activation::Identity));
        genome.push_2_connections(l, r);

        // bias 1 + hidden(1 * 1) * 1 + 0
        assert_relative_eq!(
            genome.evaluate(&[1., 0.]).unwrap()[0],
            Activation::Sigmoid.apply(2.)
        );
        assert_relative_eq!(
            genome.evaluate(&[-2., 0.]).unwrap()[0],
            Activation::Sigmoid.apply(-1.)
        );
    }

    #[test]
    fn test_evaluate_input_size() {
        let genome = two_one(&mut InnovationRegistry::new());
        assert!(matches!(
            genome.evaluate(&[1.]),
            Err(NeatError::InvalidInputSize {
                expected: 2,
                actual: 1
            })
        ));
    }

    #[test]
    fn test_evaluate_backwards_source() {
        let mut registry = InnovationRegistry::new();
        let mut genome = two_one(&mut registry);
        genome.push_neuron(Layer::new(0.5), NeuronGene::hidden(4, Activation::Sigmoid));
        genome.push_neuron(Layer::new(0.25), NeuronGene::hidden(5, Activation::Sigmoid));
        // 4 sits after 5, so 5 reads a value that was never computed
        genome.push_connection(ConnectionGene::new(4, 5, 1., &mut registry));
        assert!(matches!(
            genome.evaluate(&[0., 0.]),
            Err(NeatError::InconsistentGenome { neuron: 4 })
        ));
    }

    #[test]
    fn test_inconsistent() {
        let mut registry = InnovationRegistry::new();
        let mut layers = BTreeMap::new();
        layers.insert(Layer::INPUT, vec![NeuronGene::input(0)]);
        let err = NetworkChromosome::new(
            layers,
            vec![ConnectionGene::new(0, 9, 1., &mut registry)],
        )
        .unwrap_err();
        assert!(matches!(err, NeatError::InconsistentGenome { neuron: 9 }));
    }

    #[test]
    fn test_serialize() {
        let mut registry = InnovationRegistry::new();
        let mut genome = two_one(&mut registry);
        let (l, r) = genome.connections_mut()[0].bisect(4, &mut registry);
        genome.push_neuron(Layer::new(0.5), NeuronGene::hidden(4, Activation::Tanh));
        genome.push_2_connections(l, r);
        genome.set_fitness(3.5);

        let s = genome.to_string().unwrap();
        let restored = NetworkChromosome::from_str(&s).unwrap();
        assert_eq!(restored.connections(), genome.connections());
        assert_eq!(restored.fitness(), 3.5);
        assert_eq!(
            restored.neurons().map(|(l, n)| (l, *n)).collect::<Vec<_>>(),
            genome.neurons().map(|(l, n)| (l, *n)).collect::<Vec<_>>()
        );
        assert_eq!(
            restored.neuron(4).map(|(_, n)| n.activation),
            Some(Activation::Tanh)
        );
    }

    #[test]
    fn test_deserialize_rejects_dangling() {
        let s = r#"{"layers":[[0.0,[{"id":0,"role":"Input","activation":"Identity"}]]],
            "connections":[{"innovation":0,"source":0,"target":5,"weight":1.0,"enabled":true}]}"#;
        assert!(matches!(
            NetworkChromosome::from_str(s),
            Err(NeatError::InconsistentGenome { neuron: 5 })
        ));
    }

    #[test]
    fn test_file() {
        let genome = two_one(&mut InnovationRegistry::new());
        let path = std::env::temp_dir().join(format!("ffneat-genome-{}.json", std::process::id()));
        genome.to_file(&path).unwrap();
        let restored = NetworkChromosome::from_file(&path).unwrap();
        fs::remove_file(&path).unwrap();
        assert_eq!(restored.connections(), genome.connections());
    }
}
