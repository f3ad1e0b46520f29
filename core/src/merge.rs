//! Layered option merging with collision detection.
//!
//! A command's effective options are built in layers: common options first,
//! command options on top, and finally the selected variant's options. A
//! later layer may replace an option with the same key; what it may not do is
//! make two different keys share one short alias, or move an existing key to
//! a different alias.
//!
//! # Example
//!
//! ```
//! use std::collections::BTreeMap;
//! use buildcmd_core::*;
//!
//! let common = OptionSchema::new()
//!     .with_option(OptionSpec::value("sdk").with_abbr('s'));
//! let command = OptionSchema::new()
//!     .with_option(OptionSpec::value("platform").with_abbr('p'));
//! let mut variants = BTreeMap::new();
//! variants.insert(
//!     "android".to_string(),
//!     OptionSchema::new().with_option(OptionSpec::value("target").with_abbr('T')),
//! );
//!
//! let merged = MergedOptions::merge(&common, &command, &variants).unwrap();
//! assert_eq!(merged.base().len(), 2);
//! assert_eq!(merged.for_variant("android").len(), 3);
//! assert_eq!(merged.for_variant("ios").len(), 2);
//! ```

use std::collections::BTreeMap;

use thiserror::Error;

use crate::{OptionSchema, SchemaError, validate_schema};

/// Merge-time configuration errors.
///
/// These are fatal: they describe a broken command definition, not bad user
/// input.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    /// Two distinct keys claim the same short alias.
    #[error("alias '-{alias}' is claimed by both --{existing} and --{incoming}")]
    AliasCollision {
        alias: char,
        existing: String,
        incoming: String,
    },
    /// A layer overrides a key and gives it a different alias.
    #[error("option --{key} is reassigned from '-{from}' to '-{to}' by the {layer} layer")]
    AliasReassigned {
        key: String,
        from: char,
        to: char,
        layer: String,
    },
    /// A layer is structurally invalid on its own.
    #[error("invalid {layer} options: {source}")]
    InvalidLayer {
        layer: String,
        #[source]
        source: SchemaError,
    },
}

/// Layers `overlay` on top of `base` and returns the combined schema.
///
/// Options in `overlay` with a key already in `base` replace it in place. An
/// overriding option without an alias keeps the alias of the option it
/// replaces.
///
/// # Errors
///
/// - [`ConfigError::InvalidLayer`] if `overlay` fails [`validate_schema`].
/// - [`ConfigError::AliasReassigned`] if an override assigns a different
///   alias to the same key.
/// - [`ConfigError::AliasCollision`] if an option claims an alias already
///   owned by a different key.
///
/// # Examples
///
/// ```
/// use buildcmd_core::*;
///
/// let base = OptionSchema::new().with_option(
///     OptionSpec::value("build-type").with_abbr('b').with_default("development"),
/// );
/// let overlay = OptionSchema::new().with_option(
///     OptionSpec::value("build-type").with_default("production"),
/// );
///
/// let merged = layer_options(&base, &overlay, "command").unwrap();
/// let spec = merged.get("build-type").unwrap();
/// assert_eq!(spec.abbr, Some('b'));
/// assert_eq!(spec.default, Some(ArgValue::from("production")));
/// ```
pub fn layer_options(
    base: &OptionSchema,
    overlay: &OptionSchema,
    layer: &str,
) -> Result<OptionSchema, ConfigError> {
    check_layer(overlay, layer)?;

    let mut merged = base.clone();
    for spec in overlay {
        let mut incoming = spec.clone();

        if let Some(existing) = base.get(&spec.key) {
            match (existing.abbr, incoming.abbr) {
                (Some(from), Some(to)) if from != to => {
                    return Err(ConfigError::AliasReassigned {
                        key: spec.key.clone(),
                        from,
                        to,
                        layer: layer.to_string(),
                    });
                }
                (Some(from), None) => incoming.abbr = Some(from),
                _ => {}
            }
        }

        if let Some(alias) = incoming.abbr {
            if let Some(owner) = merged.get_by_abbr(alias) {
                if owner.key != incoming.key {
                    return Err(ConfigError::AliasCollision {
                        alias,
                        existing: owner.key.clone(),
                        incoming: incoming.key.clone(),
                    });
                }
            }
        }

        merged.insert(incoming);
    }

    Ok(merged)
}

fn check_layer(schema: &OptionSchema, layer: &str) -> Result<(), ConfigError> {
    match validate_schema(schema).into_iter().next() {
        Some(source) => Err(ConfigError::InvalidLayer {
            layer: layer.to_string(),
            source,
        }),
        None => Ok(()),
    }
}

/// Options for one command, merged across common, command and variant
/// layers.
///
/// Built once per configure call and immutable afterwards. The
/// [`surface`](MergedOptions::surface) exposes every variant's options at
/// once for help and parsing; [`for_variant`](MergedOptions::for_variant)
/// is the effective schema after a variant is chosen.
#[derive(Debug, Clone)]
pub struct MergedOptions {
    base: OptionSchema,
    layers: BTreeMap<String, OptionSchema>,
    resolved: BTreeMap<String, OptionSchema>,
    surface: OptionSchema,
}

impl MergedOptions {
    /// Merges common, command and per-variant options.
    ///
    /// Every variant layer is checked against common+command, and all
    /// variant layers are checked against each other through the parse
    /// surface, since every variant's options are parsed by the same
    /// command line.
    ///
    /// # Errors
    ///
    /// Returns the first [`ConfigError`] found. Inputs are never modified.
    pub fn merge(
        common: &OptionSchema,
        command: &OptionSchema,
        variants: &BTreeMap<String, OptionSchema>,
    ) -> Result<Self, ConfigError> {
        check_layer(common, "common")?;
        let base = layer_options(common, command, "command")?;

        let mut resolved = BTreeMap::new();
        let mut surface = base.clone();
        for (variant, layer) in variants {
            resolved.insert(variant.clone(), layer_options(&base, layer, variant)?);
            surface = layer_options(&surface, layer, variant)?;
        }

        Ok(Self {
            base,
            layers: variants.clone(),
            resolved,
            surface,
        })
    }

    /// Common plus command options.
    pub fn base(&self) -> &OptionSchema {
        &self.base
    }

    /// The effective schema once `variant` is selected.
    ///
    /// Variants without an option layer use the base schema.
    pub fn for_variant(&self, variant: &str) -> &OptionSchema {
        self.resolved.get(variant).unwrap_or(&self.base)
    }

    /// Only the options `variant` itself declares.
    pub fn variant_layer(&self, variant: &str) -> Option<&OptionSchema> {
        self.layers.get(variant)
    }

    /// Variants with an option layer, sorted.
    pub fn variants(&self) -> impl Iterator<Item = &str> {
        self.layers.keys().map(String::as_str)
    }

    /// Every option of every layer, for help rendering and parsing.
    pub fn surface(&self) -> &OptionSchema {
        &self.surface
    }
}

#[cfg(test)]
mod tests {
    use crate::{ArgValue, OptionSpec};

    use super::*;

    fn common() -> OptionSchema {
        OptionSchema::new()
            .with_option(OptionSpec::value("sdk").with_abbr('s'))
            .with_option(OptionSpec::value("log-level").with_abbr('l'))
    }

    fn command() -> OptionSchema {
        OptionSchema::new()
            .with_option(OptionSpec::value("platform").with_abbr('p').required())
            .with_option(OptionSpec::value("dir").with_abbr('d'))
    }

    fn variants(entries: Vec<(&str, OptionSchema)>) -> BTreeMap<String, OptionSchema> {
        entries
            .into_iter()
            .map(|(name, schema)| (name.to_string(), schema))
            .collect()
    }

    #[test]
    fn test_merge_disjoint_layers_is_union() {
        let variants = variants(vec![(
            "android",
            OptionSchema::new().with_option(OptionSpec::value("target").with_abbr('T')),
        )]);

        let merged = MergedOptions::merge(&common(), &command(), &variants).unwrap();

        assert_eq!(
            merged.base().keys().collect::<Vec<_>>(),
            vec!["sdk", "log-level", "platform", "dir"]
        );
        assert_eq!(
            merged.for_variant("android").keys().collect::<Vec<_>>(),
            vec!["sdk", "log-level", "platform", "dir", "target"]
        );
        assert_eq!(merged.surface().len(), 5);
    }

    #[test]
    fn test_command_overrides_common() {
        let common = OptionSchema::new()
            .with_option(OptionSpec::value("log-level").with_abbr('l').with_default("info"));
        let command = OptionSchema::new()
            .with_option(OptionSpec::value("log-level").with_abbr('l').with_default("debug"));

        let merged = MergedOptions::merge(&common, &command, &BTreeMap::new()).unwrap();

        assert_eq!(merged.base().len(), 1);
        assert_eq!(
            merged.base().get("log-level").unwrap().default,
            Some(ArgValue::from("debug"))
        );
    }

    #[test]
    fn test_variant_overrides_command() {
        let variants = variants(vec![(
            "ios",
            OptionSchema::new().with_option(
                OptionSpec::value("dir").with_description("the Xcode project directory"),
            ),
        )]);

        let merged = MergedOptions::merge(&common(), &command(), &variants).unwrap();

        let dir = merged.for_variant("ios").get("dir").unwrap();
        assert_eq!(dir.description.as_deref(), Some("the Xcode project directory"));
        assert_eq!(dir.abbr, Some('d'));
        // the base schema is untouched by the variant layer
        assert!(merged.base().get("dir").unwrap().description.is_none());
    }

    #[test]
    fn test_alias_collision_between_distinct_keys_is_error() {
        let variants = variants(vec![(
            "android",
            OptionSchema::new().with_option(OptionSpec::value("profile").with_abbr('p')),
        )]);

        let err = MergedOptions::merge(&common(), &command(), &variants).unwrap_err();

        assert_eq!(
            err,
            ConfigError::AliasCollision {
                alias: 'p',
                existing: "platform".to_string(),
                incoming: "profile".to_string(),
            }
        );
    }

    #[test]
    fn test_alias_reassignment_for_same_key_is_error() {
        let command = OptionSchema::new().with_option(OptionSpec::value("sdk").with_abbr('k'));

        let err = MergedOptions::merge(&common(), &command, &BTreeMap::new()).unwrap_err();

        assert!(matches!(
            err,
            ConfigError::AliasReassigned { ref key, from: 's', to: 'k', .. } if key == "sdk"
        ));
    }

    #[test]
    fn test_cross_variant_alias_collision_is_error() {
        let variants = variants(vec![
            (
                "android",
                OptionSchema::new().with_option(OptionSpec::value("avd-id").with_abbr('A')),
            ),
            (
                "ios",
                OptionSchema::new().with_option(OptionSpec::value("sim-id").with_abbr('A')),
            ),
        ]);

        let err = MergedOptions::merge(&common(), &command(), &variants).unwrap_err();

        assert!(matches!(err, ConfigError::AliasCollision { alias: 'A', .. }));
    }

    #[test]
    fn test_shared_variant_key_with_same_alias_is_allowed() {
        let target = || OptionSchema::new().with_option(OptionSpec::value("target").with_abbr('T'));
        let variants = variants(vec![("android", target()), ("ios", target())]);

        let merged = MergedOptions::merge(&common(), &command(), &variants).unwrap();

        assert_eq!(merged.variants().collect::<Vec<_>>(), vec!["android", "ios"]);
        assert_eq!(merged.surface().len(), 5);
    }

    #[test]
    fn test_invalid_layer_is_reported_with_layer_name() {
        let variants = variants(vec![(
            "mobileweb",
            OptionSchema::new().with_option(OptionSpec::value("Bad Key")),
        )]);

        let err = MergedOptions::merge(&common(), &command(), &variants).unwrap_err();

        assert!(matches!(err, ConfigError::InvalidLayer { ref layer, .. } if layer == "mobileweb"));
    }

    #[test]
    fn test_merge_does_not_mutate_inputs() {
        let common = common();
        let command = command();
        let before = command.keys().map(String::from).collect::<Vec<_>>();

        let _ = MergedOptions::merge(&common, &command, &BTreeMap::new()).unwrap();

        assert_eq!(command.keys().map(String::from).collect::<Vec<_>>(), before);
        assert_eq!(common.len(), 2);
    }
}
