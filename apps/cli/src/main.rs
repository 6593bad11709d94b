use clap::Parser;
use futures_util::StreamExt;
use vllm_client::{Client, CompletionOutcome, CompletionRequest};

#[derive(Parser)]
#[command(name = "infer", about = "Issue one completion request and print the result")]
struct Args {
    /// Versioned API root, e.g. http://host/v1
    #[arg(long, env = "INFER_API_BASE", default_value = "http://localhost:8000/v1")]
    api_base: String,

    /// vLLM behind a private load balancer accepts the EMPTY placeholder
    #[arg(long, env = "INFER_API_KEY", default_value = "EMPTY")]
    api_key: String,

    #[arg(long, env = "INFER_MODEL", default_value = "meta-llama/Meta-Llama-3-8B-Instruct")]
    model: String,

    #[arg(long, default_value = "A robot may not injure a human being")]
    prompt: String,

    /// Echo the prompt back in front of the completion
    #[arg(long)]
    echo: bool,

    /// Number of candidate completions to request
    #[arg(long, default_value_t = 2)]
    n: u32,

    /// Top-k log-probabilities per token position; 0 disables them
    #[arg(long, default_value_t = 3)]
    logprobs: u32,

    #[arg(long)]
    stream: bool,

    #[arg(long)]
    max_tokens: Option<u32>,

    #[arg(long)]
    temperature: Option<f32>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let args = Args::parse();

    let client = Client::new(&args.api_base, &args.api_key)?;

    let models = client.list_models().await?;
    tracing::info!(
        count = models.len(),
        models = ?models.iter().map(|m| m.id.as_str()).collect::<Vec<_>>(),
        "models_available"
    );

    let mut request = CompletionRequest::new(&args.model, &args.prompt)
        .with_echo(args.echo)
        .with_n(args.n)
        .with_stream(args.stream);
    if args.logprobs > 0 {
        request = request.with_logprobs(args.logprobs);
    }
    if let Some(max_tokens) = args.max_tokens {
        request = request.with_max_tokens(max_tokens);
    }
    if let Some(temperature) = args.temperature {
        request = request.with_temperature(temperature);
    }

    println!("Completion results:");
    match client.complete(request).await? {
        CompletionOutcome::Full(response) => {
            println!("{response:#?}");
        }
        CompletionOutcome::Stream(mut stream) => {
            while let Some(chunk) = stream.next().await {
                println!("{:?}", chunk?);
            }
        }
    }

    Ok(())
}
