use ferrobuzz_core::{AnalysisConfig, MentionTable, Pipeline, Symbol};
use tracing::info;

use crate::cli::AnalyzeArgs;
use crate::error::CliError;

use super::{price_source, CommandOutput};

fn apply_overrides(args: &AnalyzeArgs, config: &mut AnalysisConfig) {
    if let Some(folds) = args.folds {
        config.cross_validation.folds = folds;
    }
    if let Some(neighbors) = args.neighbors {
        config.cross_validation.neighbors = neighbors;
    }
    if let Some(seed) = args.seed {
        config.cross_validation.seed = seed;
    }
    if let Some(epsilon) = args.epsilon {
        config.no_change_epsilon = epsilon;
    }
    if args.no_zero_fill {
        config.zero_fill = false;
    }
}

pub async fn run(args: &AnalyzeArgs, mut config: AnalysisConfig) -> Result<CommandOutput, CliError> {
    apply_overrides(args, &mut config);
    config.validate()?;

    let mentions = MentionTable::load(&args.mentions)?;
    let symbols = if args.symbols.is_empty() {
        mentions.symbols().cloned().collect::<Vec<_>>()
    } else {
        args.symbols
            .iter()
            .map(|raw| Symbol::parse(raw))
            .collect::<Result<Vec<_>, _>>()?
    };

    let source = price_source(&args.source, &mut config)?;
    let pipeline = Pipeline::new(source, config)?;
    info!(symbols = symbols.len(), source = pipeline.source_id(), "starting analysis");

    let reports = pipeline.run(&mentions, &symbols).await?;
    Ok(CommandOutput::Reports(reports))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::PriceSourceArgs;
    use std::path::PathBuf;

    #[test]
    fn flags_override_config_values() {
        let args = AnalyzeArgs {
            mentions: PathBuf::from("mentions.csv"),
            symbols: Vec::new(),
            source: PriceSourceArgs {
                prices_csv: None,
                prices_dir: None,
                output_size: None,
            },
            folds: Some(3),
            neighbors: None,
            seed: Some(7),
            epsilon: Some(0.001),
            no_zero_fill: true,
        };
        let mut config = AnalysisConfig::default();
        apply_overrides(&args, &mut config);

        assert_eq!(config.cross_validation.folds, 3);
        assert_eq!(config.cross_validation.neighbors, 5);
        assert_eq!(config.cross_validation.seed, 7);
        assert_eq!(config.no_change_epsilon, 0.001);
        assert!(!config.zero_fill);
    }
}
