use crate::genome::{Layer, NeuronGene};
use serde::{Deserialize, Deserializer, Serializer};
use std::collections::BTreeMap;

// json object keys must be strings, so layers travel as a list of [coordinate, neurons] pairs

pub fn serialize_layers<S: Serializer>(
    layers: &BTreeMap<Layer, Vec<NeuronGene>>,
    serializer: S,
) -> Result<S::Ok, S::Error> {
    serializer.collect_seq(layers.iter())
}

/// Pairs that repeat a coordinate are merged, in the order they appear
pub fn deserialize_layers<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> Result<BTreeMap<Layer, Vec<NeuronGene>>, D::Error> {
    Vec::<(Layer, Vec<NeuronGene>)>::deserialize(deserializer).map(|pairs| {
        pairs
            .into_iter()
            .fold(BTreeMap::new(), |mut layers, (layer, neurons)| {
                layers
                    .entry(layer)
                    .or_insert_with(Vec::new)
                    .extend(neurons);
                layers
            })
    })
}
