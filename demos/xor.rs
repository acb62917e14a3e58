use approx::relative_eq;
use core::ops::ControlFlow;
use ffneat::{
    random::default_rng, Agent, Environment, EvolutionHooks, Hook, Neat, NeatConfig, Stats,
};
use tracing::info;
use tracing_subscriber::EnvFilter;

const CASES: [([f64; 2], f64); 4] = [
    ([0., 0.], 0.),
    ([0., 1.], 1.),
    ([1., 0.], 1.),
    ([1., 1.], 0.),
];

struct Xor;

impl Environment for Xor {
    fn state_size(&self) -> usize {
        2
    }

    fn action_size(&self) -> usize {
        1
    }

    /// 4 minus the squared error over every case, so a perfect network scores 4
    fn evaluate(&mut self, agent: &impl Agent) -> f64 {
        CASES.iter().fold(4., |fit, (input, want)| match agent.output(input) {
            Ok(out) => fit - (want - out[0]).powi(2),
            Err(_) => fit - 1.,
        })
    }

    fn solved(&mut self, agent: &impl Agent) -> bool {
        CASES.iter().all(|(input, want)| {
            agent
                .output(input)
                .is_ok_and(|out| relative_eq!(out[0], *want, epsilon = 0.4))
        })
    }
}

fn main() -> Result<(), Box<dyn core::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let config = match std::env::args().nth(1) {
        Some(path) => NeatConfig::from_file(path)?,
        None => NeatConfig {
            max_generations: 300,
            ..NeatConfig::default()
        },
    };

    let report: Hook = Box::new(|stats: &mut Stats<'_>| {
        if stats.generation % 25 == 0 {
            if let Some(fittest) = stats.fittest() {
                info!(
                    generation = stats.generation,
                    fitness = fittest.fitness(),
                    neurons = fittest.neuron_count(),
                    connections = fittest.connections().len(),
                    "progress"
                );
            }
        }
        ControlFlow::Continue(())
    });

    let mut neat = Neat::new(config, default_rng())?;
    let champion = neat.solve_with_hooks(&mut Xor, EvolutionHooks::new(vec![report]))?;

    info!(
        generation = neat.generation(),
        fitness = champion.fitness(),
        solved = Xor.solved(&champion),
        "done"
    );
    for (input, want) in CASES {
        println!("{input:?} -> {:.3} (want {want})", champion.evaluate(&input)?[0]);
    }

    std::fs::create_dir_all("output")?;
    champion.to_file("output/xor-champion.json")?;
    Ok(())
}
