use anyhow::{Context, Result};
use futures_util::{StreamExt, TryStreamExt, stream};
use serde_json::{Map, Value};
use tracing::{debug, info};

use crate::{
    backtest::{
        data::DataReader,
        runner::{BacktestConfig, Backtester},
    },
    optimization::params::{SweepKind, SweepParams},
};

/// Backtests one parameter combination on every day of `kind` and flattens the results.
pub fn evaluate(
    kind: SweepKind,
    params: &SweepParams,
    reader: &DataReader,
    config: BacktestConfig,
) -> Result<Map<String, Value>> {
    let scenario = params.scenario();
    let products = kind.products();

    let mut record = params.record_fields();
    let mut total_pnl = 0.0;
    let mut product_totals = vec![0.0; products.len()];
    let mut product_min = vec![1e9_f64; products.len()];
    let mut product_max = vec![-1e9_f64; products.len()];

    for (round, days) in kind.days() {
        for day in days {
            let data = reader.read_day(round, day)?;
            let result = Backtester::new(&scenario, config).run(&data)?;
            let key = kind.day_key(round, day);

            let mut day_pnl = 0.0;
            for (index, product) in products.iter().enumerate() {
                let final_pnl = result.final_pnl(product);
                let min_pnl = result.min_pnl(product);
                let max_pnl = result.max_pnl(product);

                day_pnl += final_pnl;
                product_totals[index] += final_pnl;
                product_min[index] = product_min[index].min(min_pnl);
                product_max[index] = product_max[index].max(max_pnl);

                record.insert(format!("{key}_{product}_pnl"), Value::from(final_pnl));
                record.insert(format!("{key}_{product}_min"), Value::from(min_pnl));
                record.insert(format!("{key}_{product}_max"), Value::from(max_pnl));
            }

            total_pnl += day_pnl;
            record.insert(format!("{key}_pnl"), Value::from(day_pnl));
        }
    }

    record.insert("total_pnl".into(), Value::from(total_pnl));
    for (index, product) in products.iter().enumerate() {
        record.insert(format!("total_{product}_pnl"), Value::from(product_totals[index]));
        record.insert(format!("{product}_min"), Value::from(product_min[index]));
        record.insert(format!("{product}_max"), Value::from(product_max[index]));
    }

    Ok(record)
}

/// Runs every combination on at most `workers` blocking tasks.
///
/// Records come back in input order. The first failing combination aborts the sweep.
pub async fn run_sweep(
    kind: SweepKind,
    grid: Vec<SweepParams>,
    reader: DataReader,
    config: BacktestConfig,
    workers: usize,
) -> Result<Vec<Value>> {
    let total = grid.len();
    let report_every = (total / 20).max(1);
    info!(%kind, combinations = total, workers, "starting sweep");

    let mut records = stream::iter(grid)
        .map(|params| {
            let reader = reader.clone();
            async move {
                let handle = tokio::task::spawn_blocking(move || {
                    evaluate(kind, &params, &reader, config)
                        .with_context(|| format!("sweep combination {params:?} failed"))
                });
                handle
                    .await
                    .context("sweep worker panicked")
                    .and_then(|record| record)
            }
        })
        .buffered(workers.max(1));

    let mut results = Vec::with_capacity(total);
    while let Some(record) = records.try_next().await? {
        results.push(Value::Object(record));
        if results.len() % report_every == 0 {
            debug!(completed = results.len(), total, "sweep progress");
        }
    }

    info!(%kind, combinations = results.len(), "sweep finished");
    Ok(results)
}
