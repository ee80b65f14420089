use anyhow::{anyhow, Context, Result};
use indicatif::{ProgressBar, ProgressStyle};
use log::{debug, info, warn};
use std::collections::BTreeMap;
use std::fmt;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::app_config::Config;
use crate::document::jats::Abstract;
use crate::document::journal::{Identifier, JournalRules, CROSSMARK_IMAGE};
use crate::document::regions::{self, EmailContact};
use crate::document::rewrite::{self, Finalized};
use crate::document::CalendarDate;
use crate::errors::{ExtractionError, RewriteIssue};
use crate::file_utils::FileManager;
use crate::providers::doi_org::DoiOrg;
use crate::providers::pandoc::Pandoc;
use crate::providers::{MarkupConverter, Resolver};
use crate::validation::{Classification, DoiValidator, ValidationResult};

// @module: Application controller for manuscript workflows

/// Name of the abstract sidecar written next to a publication
pub const ABSTRACT_SIDECAR: &str = "Abstract.txt";

/// Placeholder reference appended to converted abstracts
const TEST_BIBITEM: &str = "--------\\bibitem{Test_Item}\\doi{INSERT_DOI}";

/// Files produced by `publish`
#[derive(Debug)]
pub struct PublishReport {
    pub document_path: PathBuf,
    /// Absent when the abstract could not be converted
    pub abstract_path: Option<PathBuf>,
    pub issues: Vec<RewriteIssue>,
}

/// DOI check results per manuscript
#[derive(Debug, Default)]
pub struct DoiReport {
    pub files: Vec<(PathBuf, Vec<ValidationResult>)>,
}

impl DoiReport {
    pub fn checked(&self) -> usize {
        self.files.iter().map(|(_, results)| results.len()).sum()
    }

    pub fn count(&self, classification: Classification) -> usize {
        self.files
            .iter()
            .flat_map(|(_, results)| results)
            .filter(|result| result.classification == classification)
            .count()
    }
}

/// Front matter read from a manuscript; each field fails on its own
#[derive(Debug)]
pub struct Inspection {
    pub title: Result<String, ExtractionError>,
    pub dates: Result<(CalendarDate, CalendarDate), ExtractionError>,
    pub affiliations: Result<BTreeMap<u32, String>, ExtractionError>,
    pub emails: Result<Vec<EmailContact>, ExtractionError>,
}

impl Inspection {
    pub fn of(document: &str) -> Self {
        Self {
            title: regions::title(document),
            dates: regions::dates(document),
            affiliations: regions::affiliations(document),
            emails: regions::emails(document),
        }
    }
}

impl fmt::Display for Inspection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.title {
            Ok(title) => writeln!(f, "Title: {}", title)?,
            Err(e) => writeln!(f, "Title: <{}>", e)?,
        }

        match &self.dates {
            Ok((received, accepted)) => {
                writeln!(f, "Received: {}", received.dmy())?;
                writeln!(f, "Accepted: {}", accepted.dmy())?;
            }
            Err(e) => writeln!(f, "Dates: <{}>", e)?,
        }

        match &self.affiliations {
            Ok(affiliations) => {
                writeln!(f, "Affiliations:")?;
                for (label, text) in affiliations {
                    writeln!(f, "  {}. {}", label, text)?;
                }
            }
            Err(e) => writeln!(f, "Affiliations: <{}>", e)?,
        }

        match &self.emails {
            Ok(emails) => {
                writeln!(f, "Emails:")?;
                for contact in emails {
                    writeln!(f, "  {} {}", contact.symbol, contact.address)?;
                }
            }
            Err(e) => writeln!(f, "Emails: <{}>", e)?,
        }

        Ok(())
    }
}

/// Main application controller for manuscript workflows
pub struct Controller {
    // @field: App configuration
    config: Config,

    // @field: LaTeX to JATS converter
    converter: Box<dyn MarkupConverter>,
}

impl Controller {
    /// Create a new controller for test purposes with default configuration
    pub fn new_for_test() -> Result<Self> {
        Self::with_config(Config::default())
    }

    // @method: Create a new controller with the configured converter
    pub fn with_config(config: Config) -> Result<Self> {
        config.validate()?;
        let converter = Box::new(Pandoc::new(&config.converter));
        Ok(Self { config, converter })
    }

    /// Create a controller around an explicit converter
    pub fn with_converter(config: Config, converter: Box<dyn MarkupConverter>) -> Self {
        Self { config, converter }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Restamp the publication date of a manuscript in place
    pub fn change_date<P: AsRef<Path>>(&self, path: P, date: &CalendarDate) -> Result<Finalized> {
        let path = path.as_ref();
        let document = FileManager::read_to_string(path)?;

        let stamped = rewrite::stamp_dates(&document, date);
        FileManager::write_to_file(path, &stamped.document)?;

        info!("Stamped {:?} with {}", path, date.dmy());
        Ok(stamped)
    }

    /// Write the publication form of a manuscript next to it
    ///
    /// Produces `{identifier}.tex` with dots turned into underscores, the
    /// abstract sidecar and a copy of the Crossmark badge. A missing abstract
    /// or badge is logged and does not fail the run.
    pub fn publish<P: AsRef<Path>>(
        &self,
        path: P,
        identifier: &Identifier,
        date: &CalendarDate,
    ) -> Result<PublishReport> {
        let path = path.as_ref();
        let template = FileManager::read_to_string(path)?;
        let folder = FileManager::publication_folder(path);

        let finalized = rewrite::finalize(&template, identifier, date);
        let document_path = FileManager::publication_path(path, identifier);
        FileManager::write_to_file(&document_path, &finalized.document)?;
        info!("Wrote {:?} ({} issue(s))", document_path, finalized.issues.len());

        let abstract_path = match Abstract::from_document(&finalized.document, self.converter.as_ref()) {
            Ok(abstract_) => {
                let sidecar_path = folder.join(ABSTRACT_SIDECAR);
                FileManager::write_to_file(&sidecar_path, &abstract_.sidecar())?;
                debug!("Wrote abstract sidecar {:?}", sidecar_path);
                Some(sidecar_path)
            }
            Err(e) => {
                warn!("No abstract written: {}", e);
                None
            }
        };

        let badge = JournalRules::for_identifier(identifier).map_or(CROSSMARK_IMAGE, |r| r.crossmark_path);
        let badge_path = folder.join(badge);
        if let Err(e) = FileManager::copy_file(&self.config.assets.crossmark_image, &badge_path) {
            warn!("Crossmark image not copied: {}", e);
        }

        Ok(PublishReport {
            document_path,
            abstract_path,
            issues: finalized.issues,
        })
    }

    /// Replace a plain abstract file with its flattened text, notes and JATS
    pub fn write_jats_abstract<P: AsRef<Path>>(&self, path: P) -> Result<Abstract> {
        let path = path.as_ref();
        let raw = FileManager::read_to_string(path)?;
        let text = raw.replace('\n', " ").trim().to_string();

        let abstract_ = Abstract::from_text(&text, self.converter.as_ref())
            .with_context(|| format!("Failed to convert abstract in {:?}", path))?;

        let content = format!("{}\n\n{}", abstract_.sidecar(), TEST_BIBITEM);
        FileManager::write_to_file(path, &content)?;

        for (character, count) in abstract_.special_characters() {
            info!("Abstract contains '{}' {} time(s)", character, count);
        }
        Ok(abstract_)
    }

    /// Check bibliography DOIs against the configured resolver
    pub async fn check_dois<P: AsRef<Path>>(&self, path: P) -> Result<DoiReport> {
        let resolver = DoiOrg::new(&self.config.resolver)?;
        self.check_dois_with(path, resolver).await
    }

    /// Check bibliography DOIs of a manuscript, or of every `.tex` under a folder
    pub async fn check_dois_with<P: AsRef<Path>, R: Resolver>(&self, path: P, resolver: R) -> Result<DoiReport> {
        let path = path.as_ref();
        let files = if FileManager::dir_exists(path) {
            FileManager::find_files(path, "tex")?
        } else if FileManager::file_exists(path) {
            vec![path.to_path_buf()]
        } else {
            return Err(anyhow!("Input path does not exist: {:?}", path));
        };

        let validator = DoiValidator::new(
            resolver,
            self.config.resolver.concurrent_requests,
            Duration::from_secs(self.config.resolver.timeout_secs),
        );

        let mut report = DoiReport::default();
        for file in files {
            let document = FileManager::read_to_string(&file)?;
            let identifiers = match crate::validation::bibliography_dois(&document) {
                Ok(identifiers) => identifiers,
                Err(e) => {
                    if FileManager::dir_exists(path) {
                        debug!("Skipping {:?}: {}", file, e);
                        continue;
                    }
                    return Err(anyhow::Error::new(e).context(format!("No DOIs to check in {:?}", file)));
                }
            };

            info!("Checking {} DOI(s) in {:?}", identifiers.len(), file);
            let progress_bar = Self::progress_bar(identifiers.len() as u64);
            let results = validator
                .check_with_progress(&identifiers, |done, _| progress_bar.set_position(done as u64))
                .await;
            progress_bar.finish_and_clear();

            report.files.push((file, results));
        }

        info!(
            "Checked {} DOI(s): {} broken, {} suspect, {} unreachable",
            report.checked(),
            report.count(Classification::Broken),
            report.count(Classification::Suspect),
            report.count(Classification::Error)
        );
        Ok(report)
    }

    /// Read the front matter of a manuscript
    pub fn inspect<P: AsRef<Path>>(&self, path: P) -> Result<Inspection> {
        let document = FileManager::read_to_string(path)?;
        Ok(Inspection::of(&document))
    }

    fn progress_bar(length: u64) -> ProgressBar {
        let progress_bar = ProgressBar::new(length);
        let style = ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} DOIs ({percent}%) {eta}")
            .or_else(|_| ProgressStyle::default_bar().template("{spinner} [{elapsed_precise}] [{bar:40}] {pos}/{len} ({percent}%)"))
            .unwrap_or_else(|_| ProgressStyle::default_bar());
        progress_bar.set_style(style.progress_chars("█▓▒░"));
        progress_bar
    }
}
