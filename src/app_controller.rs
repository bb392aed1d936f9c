use anyhow::{Context, Result, anyhow};
use indicatif::{ProgressBar, ProgressDrawTarget, ProgressStyle};
use log::{info, warn};
use std::path::{Path, PathBuf};

use crate::app_config::Config;
use crate::language_utils;
use crate::table::RecordTable;
use crate::translation::{TranslationReport, TranslationService};

// @module: Application controller for record file translation

/// Main application controller for translating record files
pub struct Controller {
    // @field: App configuration
    config: Config,
    // @field: Draw a progress bar while batches resolve
    show_progress: bool,
}

impl Controller {
    // @method: Create a new controller with the given configuration
    pub fn with_config(config: Config) -> Result<Self> {
        config.validate().context("Configuration validation failed")?;

        Ok(Self {
            config,
            show_progress: true,
        })
    }

    /// Disable the progress bar (tests, non-interactive runs)
    pub fn without_progress(mut self) -> Self {
        self.show_progress = false;
        self
    }

    /// The active configuration
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Default output path: `<stem>.<target language>.<extension>` next to the input
    pub fn default_output_path(&self, input_file: &Path) -> PathBuf {
        let stem = input_file
            .file_stem()
            .map(|s| s.to_string_lossy().to_string())
            .unwrap_or_else(|| "records".to_string());
        let extension = input_file
            .extension()
            .map(|e| e.to_string_lossy().to_string())
            .unwrap_or_else(|| "json".to_string());

        input_file.with_file_name(format!("{}.{}.{}", stem, self.config.target_language, extension))
    }

    /// Translate a record file through the HTTPS endpoint in the configuration
    ///
    /// Returns `None` when the output already exists and `force_overwrite` is off.
    pub async fn run(
        &self,
        input_file: PathBuf,
        output_file: PathBuf,
        force_overwrite: bool,
    ) -> Result<Option<TranslationReport>> {
        let service = TranslationService::from_config(&self.config)
            .context("Failed to set up the translation client")?;
        self.run_with_service(&service, input_file, output_file, force_overwrite)
            .await
    }

    /// Translate a record file with an already-built service
    pub async fn run_with_service(
        &self,
        service: &TranslationService,
        input_file: PathBuf,
        output_file: PathBuf,
        force_overwrite: bool,
    ) -> Result<Option<TranslationReport>> {
        if !input_file.exists() {
            return Err(anyhow!("Input file does not exist: {:?}", input_file));
        }

        if output_file.exists() && !force_overwrite {
            warn!("Skipping file, output already exists (use -f to force overwrite): {:?}", output_file);
            return Ok(None);
        }

        let mut table = RecordTable::load(&input_file)?;
        let language_name = language_utils::get_language_name(&self.config.target_language)
            .unwrap_or_else(|_| self.config.target_language.clone());

        info!(
            "Translating {} records from {:?} to {}",
            table.len(),
            input_file,
            language_name
        );

        let progress_bar = self.progress_bar();
        let bar = progress_bar.clone();

        let report = service
            .translate_table(
                &mut table,
                &self.config.input_field,
                &self.config.output_field,
                self.config.status_field.as_deref(),
                move |completed, total| {
                    bar.set_length(total as u64);
                    bar.set_position(completed as u64);
                },
            )
            .await
            .context("Translation failed")?;

        progress_bar.finish_and_clear();

        table.save(&output_file)?;

        info!("{}", report.summary());
        if report.passed_through_count() > 0 {
            warn!(
                "{} records were left untranslated after exhausting retries",
                report.passed_through_count()
            );
        }
        info!("Success: {:?}", output_file);

        Ok(Some(report))
    }

    fn progress_bar(&self) -> ProgressBar {
        let progress_bar = ProgressBar::new(0);
        if !self.show_progress {
            progress_bar.set_draw_target(ProgressDrawTarget::hidden());
            return progress_bar;
        }

        let template_result = ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} batches ({percent}%) {eta}")
            .or_else(|_| ProgressStyle::default_bar().template("{spinner} [{elapsed_precise}] [{bar:40}] {pos}/{len} ({percent}%)"))
            .unwrap_or_else(|_| ProgressStyle::default_bar());
        progress_bar.set_style(template_result.progress_chars("█▓▒░"));
        progress_bar
    }
}
