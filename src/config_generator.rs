//! Generates an Icinga2 `CheckCommand` definition from the clap command of this check.

/// The environment variable that switches the binary into generator mode.
pub const GENERATE_ENV: &str = "GENERATE_ICINGA_COMMAND";

pub struct CommandDescription {
    arguments: Vec<ArgumentDescription>,
}

struct ArgumentDescription {
    long: String,
    var: String,
    description: Option<String>,
    default_value: Option<String>,
}

#[derive(Debug, thiserror::Error)]
pub enum ToIcingaCommandError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid executable path")]
    InvalidExecutablePath,
    #[error("error converting to command description: {0}")]
    CommandDescriptionFromError(#[from] CommandDescriptionFromError),
}

#[derive(Debug, thiserror::Error)]
pub enum CommandDescriptionFromError {
    #[error("argument {0} has no long name")]
    MissingLongArgument(String),
}

impl CommandDescription {
    /// Renders the definition. Custom variables are prefixed with `name`.
    pub fn to_icinga_command(&self, name: &str, executable: &str) -> String {
        let mut out = format!("object CheckCommand \"{name}\" {{\n");

        out.push_str(&format!("  command = [ \"{}\" ]\n", escape_string(executable)));
        out.push_str("  arguments = {\n");
        for arg in &self.arguments {
            out.push_str(&format!("    \"--{}\" = {{\n", arg.long));
            out.push_str(&format!("      value = \"${}_{}$\"\n", name, arg.var));

            if let Some(description) = &arg.description {
                out.push_str(&format!(
                    "      description = \"{}\"\n",
                    escape_string(description)
                ));
            }

            out.push_str("    }\n");
        }
        out.push_str("  }\n");

        let defaults: Vec<_> = self
            .arguments
            .iter()
            .filter_map(|arg| arg.default_value.as_ref().map(|v| (&arg.var, v)))
            .collect();

        if !defaults.is_empty() {
            out.push('\n');
            for (var, value) in defaults {
                out.push_str(&format!(
                    "  vars.{}_{} = \"{}\"\n",
                    name,
                    var,
                    escape_string(value)
                ));
            }
        }

        out.push_str("}\n");
        out
    }
}

fn escape_string(s: &str) -> String {
    ["\\", "\"", "$"]
        .iter()
        .fold(s.to_string(), |acc, c| acc.replace(c, &format!("\\{}", c)))
}

impl TryFrom<&clap::Command> for CommandDescription {
    type Error = CommandDescriptionFromError;

    fn try_from(cmd: &clap::Command) -> Result<Self, Self::Error> {
        let mut arguments = Vec::new();

        for arg in cmd.get_arguments() {
            let long = arg
                .get_long()
                .ok_or_else(|| {
                    CommandDescriptionFromError::MissingLongArgument(arg.get_id().to_string())
                })?
                .to_owned();

            let var = long.replace('-', "_");
            let description = arg.get_help().map(|s| s.to_string());

            let default_value = arg
                .get_default_values()
                .first()
                .and_then(|v| v.to_str())
                .map(|s| s.to_string());

            arguments.push(ArgumentDescription {
                long,
                var,
                description,
                default_value,
            });
        }

        Ok(CommandDescription { arguments })
    }
}

/// Prints the Icinga command definition and exits if [GENERATE_ENV] is set.
pub fn print_icinga_command_config_if_env_and_exit(
    name: &str,
    cmd: &clap::Command,
) -> Result<(), ToIcingaCommandError> {
    if std::env::var_os(GENERATE_ENV).is_none() {
        return Ok(());
    }

    let description = CommandDescription::try_from(cmd)?;
    let current_exe = std::env::current_exe()?;
    let executable = current_exe
        .to_str()
        .ok_or(ToIcingaCommandError::InvalidExecutablePath)?;

    println!("{}", description.to_icinga_command(name, executable).trim());
    std::process::exit(0);
}
