//! bl: CLI for the Beluga Challenge MCTS solver.
//!
//! Subcommands:
//! - solve      Greedy per-step re-search until solved or a step cap
//! - collect    One search, then training-data extraction into shards

use std::env;
use std::process;
use std::time::{Instant, SystemTime, UNIX_EPOCH};

use bl_core::{scenario, Config, ProblemState};
use bl_logging::{NdjsonWriter, SearchSummaryEventV1, StepEventV1, VersionInfoV1};
use bl_mcts::{Mcts, MctsConfig};
use bl_replay::{SampleWriter, SampleWriterConfig, TrainingSample};

fn version_info() -> VersionInfoV1 {
    VersionInfoV1 {
        protocol_version: bl_replay::PROTOCOL_VERSION,
        observation_schema_id: bl_features::OBSERVATION_SCHEMA_ID,
        action_set_id: bl_replay::ACTION_SET_ID,
    }
}

fn now_ms() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}

fn flag_value<'a>(args: &'a [String], i: usize, flag: &str) -> &'a str {
    if i + 1 >= args.len() {
        eprintln!("Missing value for {flag}");
        process::exit(1);
    }
    &args[i + 1]
}

fn parse_num<T: std::str::FromStr>(value: &str, flag: &str) -> T {
    value.parse().unwrap_or_else(|_| {
        eprintln!("Invalid {flag} value: {value}");
        process::exit(1);
    })
}

fn load_state(path: &str) -> ProblemState {
    scenario::load(path).unwrap_or_else(|e| {
        eprintln!("Failed to load scenario {path}: {e}");
        process::exit(1);
    })
}

fn print_help() {
    eprintln!(
        r#"bl - Beluga Challenge MCTS solver

USAGE:
    bl <COMMAND> [OPTIONS]

COMMANDS:
    solve       Solve a scenario with per-step re-search
    collect     Extract value-net training samples from one search

OPTIONS:
    -h, --help          Print this help message
    -V, --version       Print version

Run `bl <COMMAND> --help` for command options.
"#
    );
}

fn cmd_solve(args: &[String]) {
    let mut scenario_path: Option<String> = None;
    let mut config_path: Option<String> = None;
    let mut sims: Option<u32> = None;
    let mut depth: Option<u32> = None;
    let mut threads: Option<usize> = None;
    let mut seed: u64 = 0xBE1A;
    let mut max_steps: u32 = 200;
    let mut log_path: Option<String> = None;
    let mut debug = false;

    let mut i = 0usize;
    while i < args.len() {
        match args[i].as_str() {
            "--help" | "-h" => {
                println!(
                    r#"bl solve

USAGE:
    bl solve --scenario FILE [OPTIONS]

OPTIONS:
    --scenario FILE    Scenario JSON to solve (required)
    --config FILE      YAML config with search defaults
    --sims N           Simulations per search
    --depth D          Maximum search depth
    --threads T        Worker threads (0 = auto-detect)
    --seed S           Base RNG seed (default: 0xBE1A)
    --max-steps N      Stop after N executed actions (default: 200)
    --log FILE         Append NDJSON events to FILE
    --debug            Verbose driver output
"#
                );
                return;
            }
            "--scenario" => {
                scenario_path = Some(flag_value(args, i, "--scenario").to_string());
                i += 2;
            }
            "--config" => {
                config_path = Some(flag_value(args, i, "--config").to_string());
                i += 2;
            }
            "--sims" => {
                sims = Some(parse_num(flag_value(args, i, "--sims"), "--sims"));
                i += 2;
            }
            "--depth" => {
                depth = Some(parse_num(flag_value(args, i, "--depth"), "--depth"));
                i += 2;
            }
            "--threads" => {
                threads = Some(parse_num(flag_value(args, i, "--threads"), "--threads"));
                i += 2;
            }
            "--seed" => {
                seed = parse_num(flag_value(args, i, "--seed"), "--seed");
                i += 2;
            }
            "--max-steps" => {
                max_steps = parse_num(flag_value(args, i, "--max-steps"), "--max-steps");
                i += 2;
            }
            "--log" => {
                log_path = Some(flag_value(args, i, "--log").to_string());
                i += 2;
            }
            "--debug" => {
                debug = true;
                i += 1;
            }
            other => {
                eprintln!("Unknown option for `bl solve`: {other}");
                eprintln!("Run `bl solve --help` for usage.");
                process::exit(1);
            }
        }
    }

    let Some(scenario_path) = scenario_path else {
        eprintln!("Missing required --scenario");
        process::exit(1);
    };

    let mut params = match config_path {
        Some(p) => Config::load(&p)
            .unwrap_or_else(|e| {
                eprintln!("Failed to load config {p}: {e}");
                process::exit(1);
            })
            .search,
        None => Config::default().search,
    };
    if let Some(v) = sims {
        params.simulations = v;
    }
    if let Some(v) = depth {
        params.depth = v;
    }
    if let Some(v) = threads {
        params.num_threads = v;
    }
    params.debug = params.debug || debug;

    let mut log = log_path.map(|p| {
        NdjsonWriter::open_append_with_flush(&p, 64).unwrap_or_else(|e| {
            eprintln!("Failed to open log {p}: {e}");
            process::exit(1);
        })
    });

    let mut state = load_state(&scenario_path);
    let run_id = format!("solve-{}", now_ms());
    let start = Instant::now();
    let mut step = 0u32;

    println!(
        "Solving {scenario_path} (sims={}, depth={}, threads={})",
        params.simulations, params.depth, params.num_threads
    );

    while !state.is_terminal() && step < max_steps {
        // Fresh tree per executed action; seeds stay disjoint across steps.
        let cfg = MctsConfig::from_params(&params, seed.wrapping_add(step as u64));
        let mut mcts = Mcts::new(state.clone(), cfg).unwrap_or_else(|e| {
            eprintln!("Invalid search parameters: {e}");
            process::exit(1);
        });

        let search_start = Instant::now();
        let best = mcts.search();
        let elapsed_ms = search_start.elapsed().as_millis() as u64;

        let Some(best) = best else {
            println!("Step {step}: no legal actions from the current state, stopping.");
            break;
        };
        let (action, mean_reward) = {
            let b = best.borrow();
            (b.action.expect("root children carry actions"), b.mean_reward())
        };

        if let Some(w) = log.as_mut() {
            let root_visits = mcts.root().borrow().visits;
            let event = SearchSummaryEventV1 {
                event: "search_summary",
                ts_ms: now_ms(),
                v: version_info(),
                run_id: run_id.clone(),
                scenario: scenario_path.clone(),
                step,
                simulations: params.simulations,
                depth: params.depth,
                threads: mcts.num_threads(),
                chosen_action: Some(action.name().to_string()),
                chosen_params: action.params(),
                root_visits,
                best_mean_reward: mean_reward,
                node_count: mcts.count_total_nodes(),
                tree_depth: mcts.tree_depth(),
                solved: state.problem_solved(),
                elapsed_ms,
            };
            if let Err(e) = w.write_event(&event) {
                eprintln!("Failed to write log event: {e}");
            }
        }

        let applied = state.apply_action(action);
        assert!(applied, "search returned an illegal action {action}");
        step += 1;
        println!(
            "Step {step}: {action} (mean reward {mean_reward:.2}, {elapsed_ms} ms)"
        );

        if let Some(w) = log.as_mut() {
            let event = StepEventV1 {
                event: "step",
                ts_ms: now_ms(),
                v: version_info(),
                run_id: run_id.clone(),
                step,
                action: action.name().to_string(),
                params: action.params(),
                score: state.evaluate_with_mu(step, params.mu),
                belugas_unloaded: state.belugas_unloaded,
                belugas_finished: state.belugas_finished,
                lines_finished: state.production_lines_finished,
                solved: state.problem_solved(),
            };
            if let Err(e) = w.write_event(&event) {
                eprintln!("Failed to write log event: {e}");
            }
        }
    }

    if let Some(w) = log.as_mut() {
        let _ = w.flush();
    }

    println!();
    if state.problem_solved() {
        println!("Solved in {step} steps ({:.1}s).", start.elapsed().as_secs_f64());
    } else {
        println!(
            "Stopped after {step} steps without solving ({:.1}s).",
            start.elapsed().as_secs_f64()
        );
    }
    println!(
        "Final: belugas_unloaded={}, belugas_finished={}/{}, lines_finished={}/{}, score={:.2}",
        state.belugas_unloaded,
        state.belugas_finished,
        state.total_belugas,
        state.production_lines_finished,
        state.total_lines,
        state.evaluate_with_mu(step, params.mu)
    );
    if !state.problem_solved() {
        process::exit(2);
    }
}

fn cmd_collect(args: &[String]) {
    let mut scenario_path: Option<String> = None;
    let mut out_dir: Option<String> = None;
    let mut config_path: Option<String> = None;
    let mut sims: Option<u32> = None;
    let mut depth: Option<u32> = None;
    let mut seed: u64 = 0xBE1A;
    let mut max_samples: Option<usize> = None;
    let mut min_visits: Option<u32> = None;
    let mut shard_size: usize = 8192;

    let mut i = 0usize;
    while i < args.len() {
        match args[i].as_str() {
            "--help" | "-h" => {
                println!(
                    r#"bl collect

USAGE:
    bl collect --scenario FILE --out DIR [OPTIONS]

OPTIONS:
    --scenario FILE      Scenario JSON to search (required)
    --out DIR            Shard output directory (required)
    --config FILE        YAML config with search/collect defaults
    --sims N             Simulations for the search
    --depth D            Maximum search depth
    --seed S             RNG seed (default: 0xBE1A)
    --max-samples N      Sample cap for extraction
    --min-visits V       Visit threshold for sampled nodes
    --shard-size N       Samples per shard (default: 8192)
"#
                );
                return;
            }
            "--scenario" => {
                scenario_path = Some(flag_value(args, i, "--scenario").to_string());
                i += 2;
            }
            "--out" => {
                out_dir = Some(flag_value(args, i, "--out").to_string());
                i += 2;
            }
            "--config" => {
                config_path = Some(flag_value(args, i, "--config").to_string());
                i += 2;
            }
            "--sims" => {
                sims = Some(parse_num(flag_value(args, i, "--sims"), "--sims"));
                i += 2;
            }
            "--depth" => {
                depth = Some(parse_num(flag_value(args, i, "--depth"), "--depth"));
                i += 2;
            }
            "--seed" => {
                seed = parse_num(flag_value(args, i, "--seed"), "--seed");
                i += 2;
            }
            "--max-samples" => {
                max_samples = Some(parse_num(
                    flag_value(args, i, "--max-samples"),
                    "--max-samples",
                ));
                i += 2;
            }
            "--min-visits" => {
                min_visits = Some(parse_num(flag_value(args, i, "--min-visits"), "--min-visits"));
                i += 2;
            }
            "--shard-size" => {
                shard_size = parse_num(flag_value(args, i, "--shard-size"), "--shard-size");
                i += 2;
            }
            other => {
                eprintln!("Unknown option for `bl collect`: {other}");
                eprintln!("Run `bl collect --help` for usage.");
                process::exit(1);
            }
        }
    }

    let Some(scenario_path) = scenario_path else {
        eprintln!("Missing required --scenario");
        process::exit(1);
    };
    let Some(out_dir) = out_dir else {
        eprintln!("Missing required --out");
        process::exit(1);
    };

    let config = match config_path {
        Some(p) => Config::load(&p).unwrap_or_else(|e| {
            eprintln!("Failed to load config {p}: {e}");
            process::exit(1);
        }),
        None => Config::default(),
    };
    let mut params = config.search;
    if let Some(v) = sims {
        params.simulations = v;
    }
    if let Some(v) = depth {
        params.depth = v;
    }
    let max_samples = max_samples.unwrap_or(config.collect.max_samples);
    let min_visits = min_visits.unwrap_or(config.collect.min_visits);

    let state = load_state(&scenario_path);
    let cfg = MctsConfig::from_params(&params, seed);
    let mut mcts = Mcts::new(state, cfg).unwrap_or_else(|e| {
        eprintln!("Invalid search parameters: {e}");
        process::exit(1);
    });

    println!(
        "Searching {scenario_path} (sims={}, depth={})",
        params.simulations, params.depth
    );
    mcts.search();
    println!(
        "Tree: {} nodes, depth {}",
        mcts.count_total_nodes(),
        mcts.tree_depth()
    );

    let pairs = mcts.collect_training_data(max_samples, min_visits);
    println!(
        "Collected {} samples (max_samples={max_samples}, min_visits={min_visits})",
        pairs.len()
    );

    let mut writer = SampleWriter::new(SampleWriterConfig {
        out_dir: out_dir.clone().into(),
        max_samples_per_shard: shard_size,
        scenario: Some(scenario_path.clone()),
    })
    .unwrap_or_else(|e| {
        eprintln!("Failed to open shard writer in {out_dir}: {e}");
        process::exit(1);
    });
    let result = writer
        .extend(pairs.into_iter().map(|p| TrainingSample {
            observation: p.observation,
            value: p.value,
        }))
        .and_then(|_| writer.finish());
    if let Err(e) = result {
        eprintln!("Failed to write shards: {e}");
        process::exit(1);
    }
    println!("Shards written to {out_dir}");
}

fn main() {
    let args: Vec<String> = env::args().skip(1).collect();
    match args.first().map(|s| s.as_str()) {
        Some("solve") => cmd_solve(&args[1..]),
        Some("collect") => cmd_collect(&args[1..]),
        Some("--version") | Some("-V") => {
            println!("bl {}", env!("CARGO_PKG_VERSION"));
        }
        Some("--help") | Some("-h") | None => print_help(),
        Some(other) => {
            eprintln!("Unknown command: {other}");
            print_help();
            process::exit(1);
        }
    }
}
