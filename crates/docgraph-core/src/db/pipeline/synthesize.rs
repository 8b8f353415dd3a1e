use crate::{
    PRIMARY_KEY,
    db::{
        pipeline::{Pipeline, Stage},
        populate::ScalarMatch,
    },
    model::{FieldKind, FieldModel, TypeModel},
    overrides::Overrides,
    path::FieldPath,
};
use tracing::{debug, trace};

///
/// Synthesizer
///
/// Builds the aggregation stages that pre-join enabled reference edges at
/// the type level. Only the entity root and one level of embeds are
/// joined; anything deeper is left to the populate pass. Under
/// `ScalarMatch::Unique` scalar references are left to it as well, since
/// a flattened lookup no longer shows how many documents matched.
///

pub struct Synthesizer<'a> {
    overrides: &'a Overrides,
    scalar_match: ScalarMatch,
}

impl<'a> Synthesizer<'a> {
    #[must_use]
    pub const fn new(overrides: &'a Overrides) -> Self {
        Self {
            overrides,
            scalar_match: ScalarMatch::First,
        }
    }

    #[must_use]
    pub const fn scalar_match(mut self, scalar_match: ScalarMatch) -> Self {
        self.scalar_match = scalar_match;
        self
    }

    #[must_use]
    pub fn synthesize(&self, model: &'static TypeModel) -> Pipeline {
        let mut stages = Vec::new();
        self.walk(model, &FieldPath::root(), true, &mut stages);

        debug!(ty = model.path, stages = stages.len(), "pipeline.synthesize");

        Pipeline::new(stages)
    }

    fn walk(&self, model: &'static TypeModel, path: &FieldPath, nest: bool, out: &mut Vec<Stage>) {
        for field in model.edges() {
            let field_path = path.join(field.name);

            match &field.kind {
                FieldKind::Reference(reference) => {
                    if !self.overrides.resolve(&field_path, reference) {
                        trace!(path = %field_path, "pipeline.reference.disabled");
                        continue;
                    }
                    if !field.is_collection() && self.scalar_match == ScalarMatch::Unique {
                        trace!(path = %field_path, "pipeline.reference.unique_deferred");
                        continue;
                    }

                    push(
                        out,
                        Stage::Lookup {
                            from: reference.collection().to_string(),
                            local_field: path.join(reference.local_field).to_string(),
                            foreign_field: reference.foreign_field().to_string(),
                            as_field: field_path.to_string(),
                            is_collection: field.is_collection(),
                        },
                    );
                    if !field.is_collection() {
                        push(
                            out,
                            Stage::Unwind {
                                path: field_path.to_string(),
                                is_collection: false,
                            },
                        );
                    }
                }
                FieldKind::Embed { target } => {
                    if !nest {
                        trace!(path = %field_path, "pipeline.embed.not_nested");
                        continue;
                    }

                    let unwound = field.is_collection();
                    if unwound {
                        push(
                            out,
                            Stage::Unwind {
                                path: field_path.to_string(),
                                is_collection: true,
                            },
                        );
                    }

                    self.walk(target(), &field_path, false, out);

                    if unwound {
                        push(out, group_stage(model, field));
                    }
                }
                FieldKind::Plain => {}
            }
        }
    }
}

// Regroup by entity id, keeping every sibling except the id and the embed itself.
fn group_stage(parent: &TypeModel, embed: &FieldModel) -> Stage {
    let keep_first = parent
        .fields
        .iter()
        .filter(|field| field.name != PRIMARY_KEY && field.name != embed.name)
        .map(|field| field.name.to_string())
        .collect();

    Stage::Group {
        id_key: PRIMARY_KEY.to_string(),
        keep_first,
        push_field: embed.name.to_string(),
    }
}

fn push(out: &mut Vec<Stage>, stage: Stage) {
    trace!(index = out.len(), %stage, "pipeline.stage");
    out.push(stage);
}
