use super::models::FormatChoice;
use boltzpost::workflows::renumber::DEFAULT_OUTPUT_SUFFIX;

pub struct DefaultsConfig {
    pub format: FormatChoice,
    pub output_suffix: String,
    pub write_csv: bool,
}

impl Default for DefaultsConfig {
    fn default() -> Self {
        Self {
            format: FormatChoice::Auto,
            output_suffix: DEFAULT_OUTPUT_SUFFIX.to_string(),
            write_csv: true,
        }
    }
}
