use super::Parser;

#[derive(Parser, Debug)]
pub struct Cli {
    #[arg(long)]
    pub settings: Option<String>,
}

#[derive(Parser, Debug)]
pub struct KeygenCli {
    /// Where to write the signing key.
    #[arg(default_value = "auth.key")]
    pub target: String,
}
