//! Classification code tables: `HashMap<T, Code<T>>` keyed by code.

use super::{optional, owned_string, render_header, render_table_fn};
use crate::models::{ClassificationCode, CodeValue, Provenance};

/// One `(code, Code::<T> { .. })` entry.
pub fn render_code_entry<T: CodeValue>(code: &ClassificationCode<T>) -> String {
    format!(
        "        ({code}, Code::<{ty}> {{\n\
         \x20           code: {code},\n\
         \x20           parent_code: {parent},\n\
         \x20           description: {description},\n\
         \x20       }}),\n",
        code = code.code,
        ty = T::TYPE_NAME,
        parent = optional(code.parent_code, |p| p.to_string()),
        description = owned_string(&code.description),
    )
}

/// The `create_data_table` function over all codes, in order.
pub fn render_code_table<T: CodeValue>(codes: &[ClassificationCode<T>]) -> String {
    let entries: Vec<String> = codes.iter().map(render_code_entry).collect();
    render_table_fn(T::TYPE_NAME, &format!("Code<{}>", T::TYPE_NAME), &entries)
}

/// A complete generated code file.
pub fn render_code_file<T: CodeValue>(
    codes: &[ClassificationCode<T>],
    provenance: Option<&Provenance>,
) -> String {
    let mut out = String::new();
    if let Some(provenance) = provenance {
        out.push_str(&render_header(provenance));
    }
    out.push_str(&render_code_table(codes));
    out
}
