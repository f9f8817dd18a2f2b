use clap::Parser;
use serde::Serialize;
use swarmfield_core::equilibrium::{equilibrium_constant_at, standard_gibbs};
use swarmfield_data::reaction::{self, Reaction};

#[derive(Parser, Debug)]
#[command(author, version, about = "Query the reaction catalog", long_about = None)]
struct Args {
    /// Reaction id or name; lists the catalog when omitted
    #[arg(short, long)]
    name: Option<String>,

    /// Temperature in kelvin for K and dG0
    #[arg(short, long, default_value_t = 298.15)]
    temperature: f64,

    /// Only list exothermic reactions
    #[arg(long)]
    exothermic: bool,

    /// Emit JSON instead of text
    #[arg(long)]
    json: bool,
}

#[derive(Serialize, Debug)]
struct Report {
    reaction: &'static Reaction,
    temperature_k: f64,
    k: f64,
    delta_g0_kj_mol: f64,
}

fn report(reaction: &'static Reaction, temperature_k: f64) -> anyhow::Result<Report> {
    let k = equilibrium_constant_at(reaction, temperature_k)?;
    Ok(Report {
        reaction,
        temperature_k,
        k,
        delta_g0_kj_mol: standard_gibbs(k, temperature_k)?,
    })
}

fn main() -> anyhow::Result<()> {
    swarmfield_core::init_logging();
    let args = Args::parse();

    if let Some(name) = &args.name {
        let reaction = reaction::find(name)
            .ok_or_else(|| anyhow::anyhow!("unknown reaction: {name}"))?;
        let summary = report(reaction, args.temperature)?;
        tracing::debug!(id = reaction.id, k = summary.k, "equilibrium constant computed");

        if args.json {
            println!("{}", serde_json::to_string_pretty(&summary)?);
        } else {
            println!("{} ({})", reaction.name, reaction.equation);
            println!("  T    = {:.2} K", summary.temperature_k);
            println!("  K    = {:.4e} ({:?})", summary.k, reaction.basis);
            println!("  dG0  = {:.3} kJ/mol", summary.delta_g0_kj_mol);
            println!("  dH   = {:.1} kJ/mol", reaction.delta_h_kj_mol);
        }
        return Ok(());
    }

    let listed: Vec<&Reaction> =
        reaction::filter(|r| !args.exothermic || r.is_exothermic()).collect();
    if args.json {
        println!("{}", serde_json::to_string_pretty(&listed)?);
    } else {
        for r in listed {
            println!(
                "{:<18} {:<24} K={:.3e} @ {:.2} K  dH={:+.1} kJ/mol",
                r.id, r.equation, r.k_ref, r.t_ref_k, r.delta_h_kj_mol
            );
        }
    }

    Ok(())
}
