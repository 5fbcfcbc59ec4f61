use crate::model::HistoryKind;

/// Inputs available to a narrator for one history line.
#[derive(Debug, Clone, Copy)]
pub struct NarrativeContext<'a> {
    pub subject: &'a str,
    pub other: Option<&'a str>,
    pub year: i32,
    /// Free-form extra, e.g. a title or a trait description.
    pub detail: Option<&'a str>,
}

/// Produces the human-readable sentence stored in the history log.
///
/// Must be a pure function of its inputs: the simulation state never depends
/// on the text returned.
pub trait Narrator: Send + Sync {
    fn narrate(&self, kind: &HistoryKind, ctx: &NarrativeContext<'_>) -> String;
}

/// Plain templated narration used when no richer narrator is plugged in.
#[derive(Debug, Clone, Copy, Default)]
pub struct TemplateNarrator;

impl Narrator for TemplateNarrator {
    fn narrate(&self, kind: &HistoryKind, ctx: &NarrativeContext<'_>) -> String {
        let subject = ctx.subject;
        let other = ctx.other.unwrap_or("an unknown noble");
        match kind {
            HistoryKind::Birth => match ctx.other {
                Some(parents) => format!("{subject} was born to {parents}"),
                None => format!("{subject} was born"),
            },
            HistoryKind::Marriage => format!("{subject} married {other}"),
            HistoryKind::SuccessionStart => {
                format!("The death of {subject} left the throne empty")
            }
            HistoryKind::SuccessionEnd => match ctx.detail {
                Some(title) => format!("{subject} ascended the throne as {title}"),
                None => format!("{subject} ascended the throne"),
            },
            HistoryKind::SuccessionCrisis => format!(
                "No rightful heir could be found after {subject}; the throne stands vacant"
            ),
            HistoryKind::HeirDesignated => match ctx.detail {
                Some(title) => format!("{subject} was named {title}"),
                None => format!("{subject} was named heir"),
            },
            HistoryKind::NobleArrived => format!("{subject} arrived at court"),
            HistoryKind::Pruned => match ctx.detail {
                Some(reason) => format!("{subject} faded from the family's memory ({reason})"),
                None => format!("{subject} faded from the family's memory"),
            },
            HistoryKind::Generation => {
                format!("A new generation of House {subject} began in {}", ctx.year)
            }
            other_kind => match ctx.detail {
                Some(detail) => format!("{subject}: {other_kind} ({detail})"),
                None => format!("{subject}: {other_kind}"),
            },
        }
    }
}

/// Substitute `{key}` placeholders in a template. Unknown placeholders are
/// left as written.
pub fn render_template(template: &str, values: &[(&str, String)]) -> String {
    let mut out = template.to_string();
    for (key, value) in values {
        out = out.replace(&format!("{{{key}}}"), value);
    }
    out
}
