// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! conformgate-probe - conformance check timing tool
//!
//! Builds a small synthetic metadata image, then times the authoritative
//! conformance scan against the possibility filter for a failing and a
//! succeeding check.

use clap::{Parser, Subcommand};
use colored::*;
use conformgate::metadata::{CompositionHandle, SyntheticRuntime};
use conformgate::{
    ConformanceRegistry, ConformanceTable, FilterConfig, InterfaceId, PossibilityFilter,
    StructuralKind, TypeHandle, Verdict,
};
use std::collections::HashSet;
use std::hint::black_box;
use std::time::{Duration, Instant};

/// Conformance pre-filter probe
#[derive(Parser, Debug)]
#[command(name = "conformgate-probe")]
#[command(version)]
#[command(about = "Time authoritative vs filtered conformance checks")]
struct Args {
    #[command(subcommand)]
    mode: Mode,

    /// Keep diagnostic notices and print them at the end
    #[arg(long, global = true)]
    diagnostics: bool,
}

#[derive(Subcommand, Debug)]
enum Mode {
    /// Run the demo scenario
    Run {
        /// Timed repetitions of each check
        #[arg(short = 'n', long, default_value = "1000")]
        iterations: u32,

        /// Unrelated conformances declared to pad the authoritative scan
        #[arg(long, default_value = "2000")]
        noise: usize,

        /// Output JSON results
        #[arg(long)]
        json: bool,

        /// Quiet mode - only output final results
        #[arg(long)]
        quiet: bool,
    },
    /// Print the structural kind of a tag word (hex with 0x, or decimal)
    Classify {
        tag: String,
    },
}

fn main() {
    // Initialize logger for RUST_LOG-based debug output
    env_logger::init();

    let args = Args::parse();

    if let Err(e) = run(&args) {
        eprintln!("{}: {}", "Error".red().bold(), e);
        std::process::exit(1);
    }
}

fn run(args: &Args) -> Result<(), Box<dyn std::error::Error>> {
    match &args.mode {
        Mode::Run {
            iterations,
            noise,
            json,
            quiet,
        } => run_scenario(args, (*iterations).max(1), *noise, *json, *quiet),
        Mode::Classify { tag } => classify(tag),
    }
}

fn classify(tag: &str) -> Result<(), Box<dyn std::error::Error>> {
    let word = match tag.strip_prefix("0x").or_else(|| tag.strip_prefix("0X")) {
        Some(hex) => u64::from_str_radix(hex, 16)?,
        None => tag.parse::<u64>()?,
    };
    let kind = StructuralKind::from_tag_word(word);
    println!("{:#x} -> {}", word, kind.to_string().bold());
    Ok(())
}

/// Demo image: one class, two structs conforming to `TestInterface2`, two
/// structs conforming to nothing.
struct Scenario {
    runtime: SyntheticRuntime,
    class: TypeHandle,
    conforms: TypeHandle,
    conforms2: TypeHandle,
    no_conformance: TypeHandle,
    no_conformance2: TypeHandle,
    test_interface: CompositionHandle,
    test_interface2: CompositionHandle,
    /// Class-constrained `TestInterface2`; the fast path always hands it on.
    class_bound: CompositionHandle,
}

fn build_scenario(noise: usize) -> Result<Scenario, conformgate::Error> {
    let mut runtime = SyntheticRuntime::new();
    let first = runtime.interface("TestInterface");
    let second = runtime.interface("TestInterface2");
    let filler = runtime.interface("Filler");

    let class = runtime.record_of_kind(StructuralKind::ReferenceType);
    let conforms = runtime.value_record();
    let conforms2 = runtime.value_record();
    let no_conformance = runtime.value_record();
    let no_conformance2 = runtime.value_record();

    for _ in 0..noise {
        let ty = runtime.value_record();
        runtime.declare_conformance(ty, filler);
    }
    runtime.declare_conformance(conforms, second);
    runtime.declare_conformance(conforms2, second);

    let test_interface = CompositionHandle::new(runtime.composition(&[first]))?;
    let test_interface2 = CompositionHandle::new(runtime.composition(&[second]))?;
    let class_bound = CompositionHandle::new(runtime.reference_bound_composition(&[second]))?;
    log::debug!(
        "[probe] scenario ready: {} records ({} bytes), {} noise conformances",
        runtime.record_count(),
        runtime.leaked_bytes(),
        noise
    );

    Ok(Scenario {
        runtime,
        class,
        conforms,
        conforms2,
        no_conformance,
        no_conformance2,
        test_interface,
        test_interface2,
        class_bound,
    })
}

/// Environment settings, with `--diagnostics` switching retention and
/// unsupported-kind notices on. The flag never turns anything off.
fn filter_config(env: FilterConfig, diagnostics_flag: bool) -> FilterConfig {
    env.with_diagnostics(env.diagnostics || diagnostics_flag)
        .with_log_unsupported_kinds(env.log_unsupported_kinds || diagnostics_flag)
}

/// One timed step of the scenario.
struct Step {
    label: &'static str,
    per_check: Duration,
    outcome: String,
}

fn time_it<T>(iterations: u32, mut f: impl FnMut() -> T) -> (Duration, T) {
    let start = Instant::now();
    let mut last = f();
    for _ in 1..iterations {
        last = black_box(f());
    }
    (start.elapsed() / iterations, last)
}

fn run_scenario(
    args: &Args,
    iterations: u32,
    noise: usize,
    json: bool,
    quiet: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    if !quiet && !json {
        eprintln!("{} Conformance probe", ">>>".green().bold());
        eprintln!("    iterations={}, noise={}", iterations, noise);
    }

    let s = build_scenario(noise)?;
    let config = filter_config(FilterConfig::from_env(), args.diagnostics);
    let (steps, filter) = measure(&s, iterations, config)?;
    let verdict = filter.check(s.no_conformance, s.test_interface);

    if json {
        print_json_results(&steps, &filter, verdict, iterations);
    } else {
        print_results(&steps, &filter, verdict, quiet);
    }
    Ok(())
}

/// Time every step of the scenario and hand back the filter they ran on.
fn measure(
    s: &Scenario,
    iterations: u32,
    config: FilterConfig,
) -> Result<(Vec<Step>, PossibilityFilter<ConformanceTable>), conformgate::Error> {
    let mut steps = Vec::new();

    let (elapsed, found) = time_it(1, || {
        s.runtime.authoritative_conforms(s.class, s.test_interface)
    });
    steps.push(Step {
        label: "first authoritative check",
        per_check: elapsed,
        outcome: found.to_string(),
    });

    let registry = ConformanceTable::new(s.runtime.conformance_records());
    let start = Instant::now();
    registry.build()?;
    steps.push(Step {
        label: "registry build",
        per_check: start.elapsed(),
        outcome: format!("{} records", registry.len()),
    });

    let filter = PossibilityFilter::with_config(registry, config);

    let (elapsed, found) = time_it(iterations, || {
        s.runtime
            .authoritative_conforms(s.no_conformance, s.test_interface)
    });
    steps.push(Step {
        label: "authoritative failed check",
        per_check: elapsed,
        outcome: found.to_string(),
    });

    let (elapsed, viewed) = time_it(iterations, || {
        filter.conform(&s.no_conformance, s.test_interface, |ty| {
            s.runtime
                .authoritative_conforms(*ty, s.test_interface)
                .then_some(ty)
        })
    });
    steps.push(Step {
        label: "filtered failed check",
        per_check: elapsed,
        outcome: format!("{}", viewed.is_none()),
    });

    let (elapsed, verdict) = time_it(iterations, || {
        filter.check(s.no_conformance2, s.test_interface2)
    });
    steps.push(Step {
        label: "filtered second failed check",
        per_check: elapsed,
        outcome: verdict.to_string(),
    });

    let (elapsed, found) = time_it(iterations, || {
        s.runtime.authoritative_conforms(s.conforms, s.test_interface2)
    });
    steps.push(Step {
        label: "authoritative conformance check",
        per_check: elapsed,
        outcome: found.to_string(),
    });

    let (elapsed, viewed) = time_it(iterations, || {
        filter.conform(&s.conforms2, s.test_interface2, |ty| {
            s.runtime
                .authoritative_conforms(*ty, s.test_interface2)
                .then_some(ty)
        })
    });
    steps.push(Step {
        label: "filtered conformance check",
        per_check: elapsed,
        outcome: format!("{}", viewed.is_some()),
    });

    // Neither can be settled by the fast path; both raise notices when enabled.
    let (elapsed, verdict) = time_it(iterations, || filter.check(s.class, s.test_interface));
    steps.push(Step {
        label: "filtered class check",
        per_check: elapsed,
        outcome: verdict.to_string(),
    });

    let (elapsed, verdict) = time_it(iterations, || filter.check(s.conforms, s.class_bound));
    steps.push(Step {
        label: "filtered reference-bound check",
        per_check: elapsed,
        outcome: verdict.to_string(),
    });

    Ok((steps, filter))
}

fn print_results(
    steps: &[Step],
    filter: &PossibilityFilter<ConformanceTable>,
    verdict: Verdict,
    quiet: bool,
) {
    if quiet {
        for step in steps {
            println!("{}={:.3}us", step.label.replace(' ', "_"), micros(step.per_check));
        }
        return;
    }

    println!();
    println!("{}", "=== conformgate Probe Results ===".bold());
    println!();
    for step in steps {
        println!(
            "  {:<34} {:>12.3} us   {}",
            format!("{}:", step.label).cyan(),
            micros(step.per_check),
            step.outcome.dimmed()
        );
    }
    println!();
    println!("{}", "--- Fast path ---".dimmed());
    println!("  {} {}", "Verdict:".yellow(), verdict);
    if let Verdict::Impossible { missing } = verdict {
        println!("  {} {}", "Missing:".yellow(), interface_name(missing));
    }

    let stats = filter.stats();
    println!(
        "  {} {} queries, {} disproved, {} authoritative ({} hits)",
        "Stats:".yellow(),
        stats.queries,
        stats.disproved,
        stats.authoritative_checks,
        stats.authoritative_hits
    );
    println!(
        "  {} {:.1}%",
        "Settled without fallback:".yellow(),
        stats.fast_path_ratio() * 100.0
    );

    let diagnostics = filter.diagnostics();
    let notices = diagnostics.drain();
    if !notices.is_empty() {
        println!();
        println!("{}", "--- Diagnostics ---".dimmed());
        let mut shown = HashSet::new();
        for notice in notices {
            if shown.insert((notice.kind, notice.composition)) {
                println!(
                    "  {} x{}",
                    notice,
                    diagnostics.occurrences(notice.kind, notice.composition)
                );
            }
        }
        if diagnostics.evicted() > 0 {
            println!(
                "  {} {} older notices dropped (capacity {})",
                "Evicted:".yellow(),
                diagnostics.evicted(),
                diagnostics.capacity()
            );
        }
    }
    println!();
}

fn print_json_results(
    steps: &[Step],
    filter: &PossibilityFilter<ConformanceTable>,
    verdict: Verdict,
    iterations: u32,
) {
    let timings: Vec<String> = steps
        .iter()
        .map(|step| {
            format!(
                r#""{}":{:.3}"#,
                step.label.replace(' ', "_"),
                micros(step.per_check)
            )
        })
        .collect();
    let stats = filter.stats();
    println!(
        r#"{{"iterations":{},"timings_us":{{{}}},"verdict":"{}","stats":{{"queries":{},"disproved":{},"authoritative_checks":{},"authoritative_hits":{}}},"notices":{}}}"#,
        iterations,
        timings.join(","),
        verdict,
        stats.queries,
        stats.disproved,
        stats.authoritative_checks,
        stats.authoritative_hits,
        filter.diagnostics().len()
    );
}

fn interface_name(id: InterfaceId) -> String {
    // SAFETY: every interface identifier in the scenario is a descriptor
    // created by the synthetic runtime.
    match unsafe { id.describe() } {
        Ok(info) => info.name.to_string(),
        Err(e) => format!("{} ({})", id, e),
    }
}

fn micros(d: Duration) -> f64 {
    d.as_secs_f64() * 1_000_000.0
}
