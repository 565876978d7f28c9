//! `assetsync probe` – learn the remote digest.

use anyhow::Result;
use assetsync_core::config::SyncConfig;
use assetsync_core::probe::ProbeStrategy;
use assetsync_core::Orchestrator;

/// Print `<digest>  <strategy>`, or `unknown` when no strategy yields a digest.
pub async fn run_probe(cfg: &SyncConfig, url: &str, only: Option<ProbeStrategy>) -> Result<()> {
    let orchestrator = Orchestrator::new(cfg);
    let probe = orchestrator.validator().probe();

    let found = match only {
        Some(strategy) => probe
            .probe_with(strategy, url)
            .await
            .map(|digest| (digest, strategy)),
        None => probe.probe(url).await.map(|r| (r.digest, r.strategy)),
    };

    match found {
        Some((digest, strategy)) => println!("{}  {}", digest, strategy),
        None => {
            let tried = match only {
                Some(strategy) => vec![strategy],
                None => probe.strategies().to_vec(),
            };
            println!("unknown");
            eprintln!("tried: {}", strategy_list(&tried));
        }
    }
    Ok(())
}

fn strategy_list(strategies: &[ProbeStrategy]) -> String {
    strategies
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}
