//! CLI command definitions

use chain_agent_domain::{NoCallPolicy, OutputFormat};
use clap::{Parser, ValueEnum};
use std::path::PathBuf;

/// Output format of answers
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputArg {
    /// Answer plus a summary of capability results
    Text,
    /// `{"finalResponse", "results", "hasErrors"}`
    Json,
}

impl From<OutputArg> for OutputFormat {
    fn from(arg: OutputArg) -> Self {
        match arg {
            OutputArg::Text => OutputFormat::Text,
            OutputArg::Json => OutputFormat::Json,
        }
    }
}

/// What to do when the model proposes no capability calls
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum NoCallPolicyArg {
    /// Use the model's free-text answer as is
    ShortCircuit,
    /// Run the finalization call with an empty result set
    Finalize,
}

impl From<NoCallPolicyArg> for NoCallPolicy {
    fn from(arg: NoCallPolicyArg) -> Self {
        match arg {
            NoCallPolicyArg::ShortCircuit => NoCallPolicy::ShortCircuit,
            NoCallPolicyArg::Finalize => NoCallPolicy::Finalize,
        }
    }
}

/// CLI arguments for chain-agent
#[derive(Parser, Debug)]
#[command(name = "chain-agent")]
#[command(author, version, about = "Conversational agent for Ethereum and Cronos chains")]
#[command(long_about = r#"
chain-agent answers questions about EVM chains by letting a language model
call blockchain capabilities (balances, blocks, transactions, ABIs) and
prepare unsigned transactions (transfers, wraps, swaps) for your wallet.

Each turn runs in three steps:
1. Interpret: the model reads your query and proposes capability calls
2. Execute: the calls run concurrently against the node and explorer
3. Finalize: the model turns the results into an answer

Configuration files are loaded from (in priority order):
1. CHAIN_AGENT_* environment variables (e.g. CHAIN_AGENT_CHAIN__RPC_URL)
2. --config <path>          Explicit config file
3. ./chain-agent.toml       Project-level config
4. ~/.config/chain-agent/config.toml   Global config

Example:
  chain-agent "What is the latest block?"
  chain-agent --provider gemini "Balance of 0x71C7656EC7ab88b098defB751B7401B5f6d8976F"
  chain-agent --chat --no-call-policy finalize
"#)]
pub struct Cli {
    /// The query to run (not required in chat mode)
    pub query: Option<String>,

    /// Start interactive chat mode
    #[arg(short, long)]
    pub chat: bool,

    /// Model backend: openai, gemini or vertexai
    #[arg(short, long, value_name = "PROVIDER")]
    pub provider: Option<String>,

    /// Model id, overriding the provider's configured model
    #[arg(short, long, value_name = "MODEL")]
    pub model: Option<String>,

    /// Behaviour when the model proposes no calls
    #[arg(long, value_enum, value_name = "POLICY")]
    pub no_call_policy: Option<NoCallPolicyArg>,

    /// Output format
    #[arg(short, long, value_enum)]
    pub output: Option<OutputArg>,

    /// Verbosity level (-v = info, -vv = debug, -vvv = trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Suppress progress indicators
    #[arg(short, long)]
    pub quiet: bool,

    /// Path to configuration file
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Disable loading of configuration files
    #[arg(long)]
    pub no_config: bool,

    /// Show configuration file locations and exit
    #[arg(long)]
    pub show_config: bool,

    /// Directory for the rolling log file and the conversation transcript
    #[arg(long, value_name = "DIR")]
    pub log_dir: Option<PathBuf>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_single_query() {
        let cli = Cli::try_parse_from(["chain-agent", "-vv", "--output", "json", "latest block?"])
            .unwrap();
        assert_eq!(cli.query.as_deref(), Some("latest block?"));
        assert_eq!(cli.verbose, 2);
        assert_eq!(cli.output, Some(OutputArg::Json));
        assert!(!cli.chat);
    }

    #[test]
    fn test_parse_chat_options() {
        let cli = Cli::try_parse_from([
            "chain-agent",
            "--chat",
            "--provider",
            "vertexai",
            "--no-call-policy",
            "finalize",
            "--log-dir",
            "/tmp/logs",
        ])
        .unwrap();
        assert!(cli.chat);
        assert_eq!(cli.provider.as_deref(), Some("vertexai"));
        assert_eq!(
            cli.no_call_policy.map(NoCallPolicy::from),
            Some(NoCallPolicy::Finalize)
        );
        assert_eq!(cli.log_dir, Some(PathBuf::from("/tmp/logs")));
    }

    #[test]
    fn test_rejects_unknown_policy() {
        assert!(Cli::try_parse_from(["chain-agent", "--no-call-policy", "maybe", "q"]).is_err());
    }
}
