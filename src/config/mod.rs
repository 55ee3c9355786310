use error_stack::{Context, Report};
use thiserror::Error;

mod admin;
mod database;

pub use admin::Admin;
pub use database::{Database, DbPoolConfig};

#[derive(Debug, Error)]
#[error("Failed to load configuration")]
pub struct ParseError;

// We need to dissect the error of figment so that
// we can get more info on why admin configuration
// fails to parse (from a file or environment vars)
pub(crate) trait FigmentErrorAttachable<T: Context> {
    fn attach_figment_error(self, err: figment::Error) -> Report<T>;
}

impl<T: Context> FigmentErrorAttachable<T> for Report<T> {
    fn attach_figment_error(self, e: figment::Error) -> Report<T> {
        let mut this = self.attach_printable(format!("{}", e.kind));

        if let (Some(profile), Some(md)) = (&e.profile, &e.metadata) {
            if !e.path.is_empty() {
                let key = md.interpolate(profile, &e.path);
                this = this.attach_printable(format!("for key {key:?}"));
            }
        }

        if let Some(md) = &e.metadata {
            if let Some(source) = &md.source {
                this = this.attach_printable(format!("in {source} {}", md.name));
            } else {
                this = this.attach_printable(format!("in {}", md.name));
            }
        }

        this
    }
}
