mod synthesize;


pub use synthesize::Synthesizer;

use bson::{Bson, Document, doc};
use std::fmt;

/// Row field a collection unwind records the element index in. Null on
/// rows whose array was empty or missing; the regroup skips those.
pub const UNWIND_INDEX: &str = "_unwindIndex";

///
/// Stage
///
/// One aggregation stage descriptor. Paths are dotted from the entity root.
///

#[derive(Clone, Debug, Eq, PartialEq)]
pub enum Stage {
    /// Join `from` documents whose `foreign_field` matches `local_field` into `as_field`.
    Lookup {
        from: String,
        local_field: String,
        foreign_field: String,
        as_field: String,
        is_collection: bool,
    },

    /// Flatten the array at `path`.
    ///
    /// For a collection embed this fans out one row per element; for a
    /// scalar reference it keeps the first joined document.
    Unwind { path: String, is_collection: bool },

    /// Reassemble rows unwound from one entity.
    Group {
        id_key: String,
        keep_first: Vec<String>,
        push_field: String,
    },
}

impl Stage {
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::Lookup { .. } => "lookup",
            Self::Unwind { .. } => "unwind",
            Self::Group { .. } => "group",
        }
    }

    /// Render as a MongoDB aggregation stage.
    #[must_use]
    pub fn to_document(&self) -> Document {
        match self {
            Self::Lookup {
                from,
                local_field,
                foreign_field,
                as_field,
                ..
            } => doc! {
                "$lookup": {
                    "from": from.as_str(),
                    "localField": local_field.as_str(),
                    "foreignField": foreign_field.as_str(),
                    "as": as_field.as_str(),
                }
            },
            Self::Unwind {
                path,
                is_collection: true,
            } => doc! {
                "$unwind": {
                    "path": format!("${path}"),
                    "includeArrayIndex": UNWIND_INDEX,
                    "preserveNullAndEmptyArrays": true,
                }
            },
            Self::Unwind {
                path,
                is_collection: false,
            } => {
                let mut set = Document::new();
                set.insert(path, doc! { "$first": format!("${path}") });

                doc! { "$set": set }
            }
            Self::Group {
                id_key,
                keep_first,
                push_field,
            } => {
                let mut group = Document::new();
                group.insert("_id", format!("${id_key}"));
                for field in keep_first {
                    group.insert(field, doc! { "$first": format!("${field}") });
                }
                group.insert(
                    push_field,
                    doc! {
                        "$push": {
                            "$cond": [
                                { "$eq": [format!("${UNWIND_INDEX}"), Bson::Null] },
                                "$$REMOVE",
                                format!("${push_field}"),
                            ]
                        }
                    },
                );

                doc! { "$group": group }
            }
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Lookup {
                from,
                local_field,
                foreign_field,
                as_field,
                is_collection,
            } => write!(
                f,
                "LOOKUP {from}.{foreign_field} = {local_field} AS {as_field}{}",
                if *is_collection { " (many)" } else { "" }
            ),
            Self::Unwind {
                path,
                is_collection,
            } => write!(
                f,
                "UNWIND {path}{}",
                if *is_collection { " (embed)" } else { " (first)" }
            ),
            Self::Group {
                id_key,
                keep_first,
                push_field,
            } => write!(
                f,
                "GROUP BY {id_key} KEEP [{}] PUSH {push_field}",
                keep_first.join(", ")
            ),
        }
    }
}

///
/// Pipeline
/// Ordered stage list produced by the synthesizer.
///

#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct Pipeline(Vec<Stage>);

impl Pipeline {
    #[must_use]
    pub const fn new(stages: Vec<Stage>) -> Self {
        Self(stages)
    }

    #[must_use]
    pub fn stages(&self) -> &[Stage] {
        &self.0
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Rendered stages, ready to send to a MongoDB driver.
    #[must_use]
    pub fn to_documents(&self) -> Vec<Document> {
        self.0.iter().map(Stage::to_document).collect()
    }

    /// Rendered stages as a BSON array.
    #[must_use]
    pub fn to_bson(&self) -> Bson {
        Bson::Array(self.to_documents().into_iter().map(Bson::Document).collect())
    }

    #[must_use]
    pub fn into_stages(self) -> Vec<Stage> {
        self.0
    }
}

impl fmt::Display for Pipeline {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (index, stage) in self.0.iter().enumerate() {
            if index > 0 {
                writeln!(f)?;
            }
            write!(f, "{stage}")?;
        }

        Ok(())
    }
}

impl<'a> IntoIterator for &'a Pipeline {
    type Item = &'a Stage;
    type IntoIter = std::slice::Iter<'a, Stage>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}
