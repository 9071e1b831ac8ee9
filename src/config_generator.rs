//! Generates Icinga2 `CheckCommand` objects from the clap definition of the checks.

use clap::ArgAction;

/// Arguments clap adds on its own. Icinga has no use for them.
const SKIPPED_ARGUMENTS: &[&str] = &["help", "version"];

/// Prefix of the custom variables, so `host` does not clash with Icinga's own macros.
const VAR_PREFIX: &str = "ontap_";

pub struct CommandDescription {
    subcommand: Option<String>,
    arguments: Vec<ArgumentDescription>,
}

pub struct ArgumentDescription {
    name: String,
    value: String,
    description: Option<String>,
    is_flag: bool,
    is_repeated: bool,
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

impl CommandDescription {
    /// Renders the `CheckCommand` with the check running through `exe`.
    pub fn to_icinga_command_for(&self, name: &str, exe: &str) -> String {
        let mut out = format!("object CheckCommand \"{name}\" {{\n");

        match &self.subcommand {
            Some(sub) => out.push_str(&format!("  command = [ \"{exe}\", \"{sub}\" ]\n")),
            None => out.push_str(&format!("  command = [ \"{exe}\" ]\n")),
        }

        out.push_str("  arguments = {\n");
        for arg in &self.arguments {
            out.push_str(&format!("  \"--{}\" = {{\n", arg.name));

            if arg.is_flag {
                out.push_str(&format!("    set_if = \"${}$\"\n", arg.value));
            } else {
                out.push_str(&format!("    value = \"${}$\"\n", arg.value));
            }

            if arg.is_repeated {
                out.push_str("    repeat_key = false\n");
            }

            if let Some(description) = &arg.description {
                out.push_str(&format!(
                    "    description = \"{}\"\n",
                    escape_string(description)
                ));
            }

            out.push_str("  }\n");
        }
        out.push_str("  }\n");

        let defaults: Vec<_> = self
            .arguments
            .iter()
            .filter_map(|arg| arg.default_value.as_ref().map(|d| (&arg.value, d)))
            .collect();
        if !defaults.is_empty() {
            out.push('\n');
        }
        for (value, default_value) in defaults {
            out.push_str(&format!(
                "  vars.{} = \"{}\"\n",
                value,
                escape_string(default_value)
            ));
        }

        out.push_str("}\n");
        out
    }

    pub fn to_icinga_command(&self, name: &str) -> Result<String, ToIcingaCommandError> {
        let current_exe = std::env::current_exe()?
            .to_str()
            .ok_or(ToIcingaCommandError::InvalidExecutablePath)?
            .to_owned();

        Ok(self.to_icinga_command_for(name, &current_exe))
    }
}

fn escape_string(s: &str) -> String {
    ["\"", "$"]
        .iter()
        .fold(s.to_string(), |acc, c| acc.replace(c, &format!("\\{}", c)))
}

#[derive(Debug, thiserror::Error)]
pub enum CommandDescriptionFromError {
    #[error("missing long argument for {0}")]
    MissingLongArgument(String),
}

impl TryFrom<&clap::Command> for CommandDescription {
    type Error = CommandDescriptionFromError;

    fn try_from(cmd: &clap::Command) -> Result<Self, Self::Error> {
        let mut arguments = Vec::new();

        for arg in cmd.get_arguments() {
            if SKIPPED_ARGUMENTS.contains(&arg.get_id().as_str()) {
                continue;
            }

            let name = arg
                .get_long()
                .ok_or_else(|| {
                    CommandDescriptionFromError::MissingLongArgument(arg.get_id().to_string())
                })?
                .to_owned();

            let value = format!("{}{}", VAR_PREFIX, name.replace('-', "_"));
            let description = arg.get_help().map(|s| s.to_string());
            let is_flag = matches!(arg.get_action(), ArgAction::SetTrue | ArgAction::Count);
            let is_repeated = arg
                .get_num_args()
                .map_or(false, |range| range.max_values() > 1);

            // clap gives flags implicit defaults like "false", set_if must stay unset instead
            let default_value = arg
                .get_default_values()
                .first()
                .filter(|_| !is_flag)
                .and_then(|v| v.to_str())
                .map(|s| s.to_string());

            arguments.push(ArgumentDescription {
                name,
                value,
                description,
                is_flag,
                is_repeated,
                default_value,
            });
        }

        Ok(CommandDescription {
            subcommand: None,
            arguments,
        })
    }
}

/// One description per subcommand, each running `<exe> <subcommand>`.
pub fn describe_subcommands(
    cmd: &clap::Command,
) -> Result<Vec<(String, CommandDescription)>, CommandDescriptionFromError> {
    let mut cmd = cmd.clone();
    cmd.build();

    let mut out = Vec::new();
    for sub in cmd.get_subcommands().filter(|sub| sub.get_name() != "help") {
        let mut description = CommandDescription::try_from(sub)?;
        description.subcommand = Some(sub.get_name().to_owned());
        out.push((sub.get_name().to_owned(), description));
    }
    Ok(out)
}

/// Print the Icinga command configuration for every subcommand if the GENERATE_ICINGA_COMMAND
/// environment variable is set and exit the process.
///
/// The objects are named `<prefix>_<subcommand>` with dashes turned into underscores.
pub fn print_icinga_command_config_if_env_and_exit(
    prefix: &str,
    cmd: &clap::Command,
) -> Result<(), ToIcingaCommandError> {
    if std::env::var("GENERATE_ICINGA_COMMAND").is_err() {
        return Ok(());
    }

    for (sub, description) in describe_subcommands(cmd)? {
        let name = format!("{}_{}", prefix, sub.replace('-', "_"));
        let out = description.to_icinga_command(&name)?;
        println!("{}\n", out.trim());
    }
    std::process::exit(0);
}

#[cfg(test)]
mod tests {
    use clap::CommandFactory;

    use super::*;
    use crate::cli::Cli;

    fn describe(sub: &str) -> CommandDescription {
        describe_subcommands(&Cli::command())
            .unwrap()
            .into_iter()
            .find(|(name, _)| name == sub)
            .map(|(_, description)| description)
            .unwrap()
    }

    #[test]
    fn test_escape_string() {
        assert_eq!(escape_string("say \"$hi\""), "say \\\"\\$hi\\\"");
    }

    #[test]
    fn test_all_subcommands_are_described() {
        let names: Vec<_> = describe_subcommands(&Cli::command())
            .unwrap()
            .into_iter()
            .map(|(name, _)| name)
            .collect();

        assert_eq!(names.len(), 12);
        assert!(names.contains(&"volume-usage".to_owned()));
        assert!(names.contains(&"snapmirror-health".to_owned()));
    }

    #[test]
    fn test_about_command() {
        let out = describe("about").to_icinga_command_for("ontap_about", "/usr/lib/check_ontap");

        assert!(out.starts_with(
            "object CheckCommand \"ontap_about\" {\n  command = [ \"/usr/lib/check_ontap\", \"about\" ]\n"
        ));
        assert!(out.contains("  \"--host\" = {\n    value = \"$ontap_host$\"\n"));
        assert!(out.contains("  \"--disable-ssl-verification\" = {\n    set_if = \"$ontap_disable_ssl_verification$\"\n"));
        assert!(out.contains("  \"--verbose\" = {\n    set_if = \"$ontap_verbose$\"\n"));
        assert!(out.contains("  vars.ontap_port = \"443\"\n"));
        assert!(!out.contains("--help"));
        assert!(!out.contains("vars.ontap_verbose"));
        assert!(out.ends_with("}\n"));
    }

    #[test]
    fn test_repeated_arguments() {
        let out = describe("hardware-health").to_icinga_command_for("hw", "check_ontap");

        assert!(out.contains("  \"--type\" = {\n    value = \"$ontap_type$\"\n    repeat_key = false\n"));
        assert!(out.contains("  \"--perfdata\" = {\n    set_if = \"$ontap_perfdata$\"\n"));
    }

    #[test]
    fn test_missing_long_argument() {
        let cmd = clap::Command::new("test").arg(clap::Arg::new("positional"));
        assert!(matches!(
            CommandDescription::try_from(&cmd),
            Err(CommandDescriptionFromError::MissingLongArgument(_))
        ));
    }
}
