//! Template expansion for config values
//!
//! Uses minijinja. One function with an escaping flag:
//! - `shell_escape: true`: values are shell-escaped at output time, for setup commands
//! - `shell_escape: false`: values are substituted literally, for paths and names

use std::borrow::Cow;
use std::collections::HashMap;

use anyhow::anyhow;
use color_print::cformat;
use minijinja::{Environment, UndefinedBehavior, Value};
use shell_escape::escape;

use crate::git::sanitize_branch_name;
use crate::styling::{eprintln, format_with_gutter, info_message, verbosity};

/// Expand `template` with `vars`.
///
/// # Filters
/// - `sanitize`: replace `/` and `\` with `-`
///
/// Referencing an undefined variable is an error; `{% if var %}` checks are
/// allowed. `name` identifies the template in errors and verbose output.
pub fn expand_template(
    template: &str,
    vars: &HashMap<&str, &str>,
    shell_escape: bool,
    name: &str,
) -> anyhow::Result<String> {
    let context: HashMap<String, Value> = vars
        .iter()
        .map(|(key, value)| (key.to_string(), Value::from(value.to_string())))
        .collect();

    let mut env = Environment::new();
    env.set_undefined_behavior(UndefinedBehavior::SemiStrict);
    if shell_escape {
        env.set_keep_trailing_newline(true);
        // Escape at output time so filters see raw values
        env.set_formatter(|out, _state, value| {
            if value.is_none() {
                return Ok(());
            }
            let s = value.to_string();
            let escaped = escape(Cow::Borrowed(&s));
            write!(out, "{escaped}")?;
            Ok(())
        });
    }
    env.add_filter("sanitize", |value: Value| -> String {
        sanitize_branch_name(value.as_str().unwrap_or_default())
    });

    let verbose = verbosity();
    if verbose >= 2 {
        log::debug!("[template:{name}] template={template:?}");
        let mut sorted_vars: Vec<_> = vars.iter().collect();
        sorted_vars.sort_by_key(|(k, _)| *k);
        log::debug!(
            "[template:{name}] vars={{{}}}",
            sorted_vars
                .iter()
                .map(|(k, v)| format!("{k}={v:?}"))
                .collect::<Vec<_>>()
                .join(", ")
        );
    }

    let tmpl = env
        .template_from_named_str(name, template)
        .map_err(|e| anyhow!("Template syntax error in {name}: {e}"))?;
    let result = tmpl
        .render(Value::from_object(context))
        .map_err(|e| anyhow!("Template render error in {name}: {e}"))?;

    if verbose >= 2 {
        log::debug!("[template:{name}] result={result:?}");
    } else if verbose == 1 {
        let header = info_message(cformat!("Expanding <bold>{name}</>"));
        let content = cformat!("{template} <dim>→</> {result}");
        eprintln!("{header}\n{}", format_with_gutter(&content));
    }

    Ok(result)
}
