//! The preparation run, stage by stage.
//!
//! acquire -> generate headers -> setup.cfg -> config.h -> verify
//!
//! Acquisition failures stop the run before any header is generated. A
//! template that cannot be read stops it immediately. Verification never
//! stops early; its verdict is returned for the caller to act on.

use crate::acquire::{self, AcquireReport, Fetcher};
use crate::artifacts::{self, SetupCfg};
use crate::config::Settings;
use crate::core::error::PrepError;
use crate::core::output;
use crate::template;
use crate::verify::{self, VerificationReport};
use std::path::PathBuf;

const STAGES: usize = 5;

/// What a completed run did.
#[derive(Debug)]
pub struct RunSummary {
    pub acquisition: AcquireReport,
    pub generated: Vec<PathBuf>,
    pub setup_cfg: SetupCfg,
    pub verification: VerificationReport,
}

impl RunSummary {
    pub fn ready(&self) -> bool {
        self.verification.ready()
    }
}

/// Render every template in every scan root, in scan order.
pub fn generate_headers(settings: &Settings) -> Result<Vec<PathBuf>, PrepError> {
    let mut generated = Vec::new();
    for root in settings.scan_roots() {
        for template_path in template::templates_in(&root)? {
            let dest = template::generate(&template_path, &settings.substitutions)?;
            output::sub_action(&format!("generated: {}", dest.display()));
            generated.push(dest);
        }
    }
    Ok(generated)
}

/// Run every stage against `settings.root`.
pub fn run(fetcher: &dyn Fetcher, settings: &Settings) -> Result<RunSummary, PrepError> {
    output::action_numbered(1, STAGES, "Downloading + extracting dependency libraries");
    let acquisition = acquire::acquire_all(fetcher, settings).into_result()?;
    tracing::info!(fetched = acquisition.fetched(), "acquisition complete");

    output::action_numbered(2, STAGES, "Generating .h files from .h.in templates");
    let generated = generate_headers(settings)?;
    output::info(&format!("Total generated: {} header files", generated.len()));

    output::action_numbered(3, STAGES, "Generating setup.cfg");
    let setup_cfg = artifacts::write_setup_cfg(&settings.root, &settings.version)?;
    match &setup_cfg {
        SetupCfg::Rendered(path) => output::sub_action(&format!("written: {}", path.display())),
        SetupCfg::Minimal(path) => {
            output::sub_action(&format!("written (minimal): {}", path.display()))
        }
    }

    output::action_numbered(4, STAGES, "Writing common/config.h");
    let config_h = settings.config_header_path();
    artifacts::write_config_header(&config_h)?;
    output::sub_action(&format!("written: {}", config_h.display()));

    output::action_numbered(5, STAGES, "Verification");
    let verification = verify::verify(&settings.source_dirs(), &settings.expected_artifacts());
    verification.print();

    Ok(RunSummary {
        acquisition,
        generated,
        setup_cfg,
        verification,
    })
}
