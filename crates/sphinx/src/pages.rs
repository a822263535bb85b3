//! Embedded page templates.
//!
//! Templates are compiled into the binary and registered once at startup,
//! so a malformed template stops the process before it serves anything.
//! HTML auto-escaping is on; only the operator-supplied `riddle` markup is marked `safe`.

use minijinja::{Environment, context};
use sphinx_common::{SphinxError, Stage};

use crate::config::RiddleConfig;

const INDEX_HTML: &str = include_str!("../templates/index.html");
const Q2_HTML: &str = include_str!("../templates/q2.html");
const Q3_HTML: &str = include_str!("../templates/q3.html");

/// Served verbatim at /robots.txt
pub const ROBOTS_TXT: &str = include_str!("../templates/robots.txt");

/// Template name for each stage's page
pub fn template_name(stage: Stage) -> &'static str {
    match stage {
        Stage::First => "index.html",
        Stage::Second => "q2.html",
        Stage::Final => "q3.html",
    }
}

/// Page renderer
pub struct Pages {
    env: Environment<'static>,
    index_url: String,
    riddles: RiddleConfig,
}

impl Pages {
    /// Register the embedded templates
    pub fn new(index_url: impl Into<String>, riddles: RiddleConfig) -> Result<Self, SphinxError> {
        Self::with_templates(
            index_url,
            riddles,
            &[
                (template_name(Stage::First), INDEX_HTML),
                (template_name(Stage::Second), Q2_HTML),
                (template_name(Stage::Final), Q3_HTML),
            ],
        )
    }

    /// Register an explicit template set
    pub fn with_templates(
        index_url: impl Into<String>,
        riddles: RiddleConfig,
        templates: &[(&'static str, &'static str)],
    ) -> Result<Self, SphinxError> {
        let mut env = Environment::new();
        for (name, source) in templates {
            env.add_template(*name, *source)
                .map_err(|e| SphinxError::Template(format!("{name}: {e}")))?;
        }

        Ok(Self {
            env,
            index_url: index_url.into(),
            riddles,
        })
    }

    /// Stage-one page
    pub fn index(&self) -> Result<String, SphinxError> {
        self.render(Stage::First, None)
    }

    /// Stage-two page. `guid` is decorative and never stored.
    pub fn second(&self, guid: &str) -> Result<String, SphinxError> {
        self.render(Stage::Second, Some(guid))
    }

    /// Final page, carrying the token the form posts back to
    pub fn last(&self, token: &str) -> Result<String, SphinxError> {
        self.render(Stage::Final, Some(token))
    }

    fn render(&self, stage: Stage, guid: Option<&str>) -> Result<String, SphinxError> {
        let name = template_name(stage);
        let riddle = match stage {
            Stage::First => self.riddles.first.as_deref(),
            Stage::Second => self.riddles.second.as_deref(),
            Stage::Final => self.riddles.last.as_deref(),
        };

        self.env
            .get_template(name)
            .and_then(|template| {
                template.render(context! {
                    index_url => &self.index_url,
                    guid => guid,
                    riddle => riddle,
                })
            })
            .map_err(|e| SphinxError::Template(format!("{name}: {e}")))
    }
}
