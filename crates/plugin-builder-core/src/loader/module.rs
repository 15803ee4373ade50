use super::setting::Arguments;
use super::{entity, expect_setting, file_label, outline, setting_literal};
use crate::domain::{DefinitionKind, DiscoveredFile, DomainError, ModuleDefinition};

const SETTING_PARAMS: &[&str] = &["workspace", "category", "version", "update"];

/// Loads a module: the `ModuleHeader` setting plus everything written
/// after the header class, with leading whitespace trimmed.
pub fn load_module(file: &DiscoveredFile, text: &str) -> Result<ModuleDefinition, DomainError> {
    let label = file_label(file);
    let outline = outline(file, text)?;
    let header = entity(&outline, "ModuleHeader", file)?;
    let literal = setting_literal(&outline, header, file)?;
    let call = expect_setting(&literal, "Setting", file)?;
    let args = Arguments::bind(call, SETTING_PARAMS, &label)?;
    let unit = super::definition_unit(&args, file.stem.clone(), file, DefinitionKind::Module)?;

    Ok(ModuleDefinition {
        unit,
        code: outline.text_after(header).trim_start().to_string(),
    })
}
