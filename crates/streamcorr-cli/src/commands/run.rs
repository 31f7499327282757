use streamcorr_core::{Pipeline, PipelineConfig};

use crate::driver;

pub struct RunCommandConfig {
    pub variables: usize,
    pub rate: f64,
    pub window: usize,
    pub iterations: u64,
    pub seed: Option<u64>,
    pub max_pending: usize,
    pub output: Option<String>,
}

pub fn run(cfg: RunCommandConfig) {
    let mut config = PipelineConfig::new(cfg.variables, cfg.rate, cfg.window, cfg.iterations);
    config.max_pending_batches = cfg.max_pending;

    let built = match cfg.seed {
        Some(seed) => Pipeline::build_seeded(&config, seed),
        None => Pipeline::build(&config),
    };
    let mut pipeline = match built {
        Ok(p) => p,
        Err(e) => {
            eprintln!("Cannot build pipeline: {e}");
            std::process::exit(1);
        }
    };

    println!(
        "Running {} streams ({} samples each at {} Hz), window {}, {} pair operators...\n",
        config.variable_count,
        config.iteration_count,
        config.sampling_rate,
        config.window_size,
        config.pair_count(),
    );

    let frames = match driver::execute(&mut pipeline) {
        Ok(frames) => frames,
        Err(e) => {
            eprintln!("Pipeline failed: {e}");
            std::process::exit(1);
        }
    };

    for frame in &frames {
        println!("batch {}:", frame.batch);
        println!("{}", frame.matrix);
    }
    println!("{} completed matrix(es)", frames.len());

    if let Some(path) = &cfg.output {
        let json = match serde_json::to_string_pretty(&frames) {
            Ok(json) => json,
            Err(e) => {
                eprintln!("Cannot serialize matrices: {e}");
                std::process::exit(1);
            }
        };
        if let Err(e) = std::fs::write(path, json) {
            eprintln!("Cannot write {path}: {e}");
            std::process::exit(1);
        }
        println!("Wrote {} frame(s) to {path}", frames.len());
    }
}
