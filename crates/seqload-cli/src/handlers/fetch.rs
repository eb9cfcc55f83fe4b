//! `seqload fetch` handler.

use std::sync::Arc;
use std::time::Duration;

use seqload_core::{LoaderConfig, LoaderEvent, ResourceDescriptor, ResultSummary};
use seqload_loader::{
    AudioDecorator, EventName, HttpTransport, HttpTransportConfig, Loader, QueueController,
};

use crate::error::CliError;
use crate::manifest::Manifest;
use crate::parser::FetchArgs;

/// Everything needed to run one fetch, resolved from arguments and manifest.
#[derive(Debug)]
pub struct FetchPlan {
    pub items: Vec<ResourceDescriptor>,
    pub loader: LoaderConfig,
    pub transport: HttpTransportConfig,
}

impl FetchPlan {
    /// Merge the manifest (if any) with command-line arguments.
    ///
    /// Flags win over manifest settings; manifest items come before
    /// positional keys.
    pub fn from_args(args: &FetchArgs) -> Result<Self, CliError> {
        let manifest = match &args.manifest {
            Some(path) => Manifest::from_path(path)?,
            None => Manifest::default(),
        };
        Self::merge(manifest, args)
    }

    fn merge(manifest: Manifest, args: &FetchArgs) -> Result<Self, CliError> {
        let mut items = manifest.items;
        items.extend(args.keys.iter().map(|key| ResourceDescriptor::new(key.as_str())));
        if items.is_empty() {
            return Err(CliError::Arguments(
                "nothing to fetch: pass keys or --manifest".to_string(),
            ));
        }

        let mut loader = manifest.config.unwrap_or_default();
        if args.debug {
            loader = loader.with_debug(true);
        }
        if let Some(encoding) = args.encoding {
            loader = loader.with_response_encoding(encoding);
        }

        let mut transport =
            HttpTransportConfig::new().with_timeout(Duration::from_secs(args.timeout));
        if let Some(base) = args.base_url.as_ref().or(manifest.base_url.as_ref()) {
            transport = transport.with_base_url(base.as_str());
        }

        Ok(Self {
            items,
            loader,
            transport,
        })
    }
}

/// Run a fetch and print its events and summary.
///
/// Ctrl-C cancels the loader; the fetch in flight still settles and is
/// reported.
pub async fn execute(args: &FetchArgs) -> Result<ResultSummary, CliError> {
    let plan = FetchPlan::from_args(args)?;
    let json = args.json;
    let debug = plan.loader.debug;

    let transport = HttpTransport::new(&plan.transport)?;
    let loader = Loader::spawn(
        plan.loader,
        Arc::new(transport),
        Arc::new(AudioDecorator::new()),
    );
    let handle = loader.handle().clone();

    for name in [EventName::ItemLoaded, EventName::ItemError] {
        handle.on(name, move |event: &LoaderEvent| {
            println!("{}", format_event(event, json));
        })?;
    }

    tracing::info!(items = plan.items.len(), "Starting fetch");
    handle.enqueue(plan.items)?;

    tokio::select! {
        settled = handle.wait_settled() => {
            settled?;
        }
        _ = tokio::signal::ctrl_c() => {
            tracing::warn!("Interrupted; waiting for the current fetch to settle");
            handle.cancel()?;
        }
    }

    let controller = loader.finish().await?;
    if debug {
        print_traces(&controller);
    }

    let summary = controller.results().summary();
    println!("{}", format_summary(&summary, json));
    Ok(summary)
}

/// One output line for an item event.
pub fn format_event(event: &LoaderEvent, json: bool) -> String {
    if json {
        return serde_json::to_string(event).unwrap_or_else(|e| {
            serde_json::json!({ "type": "serializationError", "message": e.to_string() })
                .to_string()
        });
    }

    match event {
        LoaderEvent::ItemLoaded { result, item } => {
            format!("loaded  {} ({}, {} bytes)", item.key, result.mime, result.size)
        }
        LoaderEvent::ItemError { data, error, .. } => {
            format!("failed  {}: {}", data.key, error.user_message())
        }
        LoaderEvent::Complete { .. } | LoaderEvent::Custom { .. } => event.name().to_string(),
    }
}

/// Final summary line.
pub fn format_summary(summary: &ResultSummary, json: bool) -> String {
    if json {
        return serde_json::json!({ "type": "summary", "summary": summary }).to_string();
    }
    format!(
        "{} loaded, {} failed ({} errors)",
        summary.loaded, summary.errored, summary.total_errors
    )
}

fn print_traces(controller: &QueueController) {
    for trace in controller.debug_traces() {
        eprintln!("debug: {trace}");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bytes::Bytes;
    use seqload_core::{FetchError, MediaHandle, ResponseEncoding};

    fn args(keys: &[&str]) -> FetchArgs {
        FetchArgs {
            keys: keys.iter().map(ToString::to_string).collect(),
            manifest: None,
            base_url: None,
            encoding: None,
            timeout: 30,
            debug: false,
            json: false,
        }
    }

    #[test]
    fn test_plan_requires_items() {
        let err = FetchPlan::merge(Manifest::default(), &args(&[])).unwrap_err();
        assert!(matches!(err, CliError::Arguments(_)));
    }

    #[test]
    fn test_plan_flags_override_manifest() {
        let manifest = Manifest {
            base_url: Some("https://manifest.test/".into()),
            config: Some(LoaderConfig::new().with_response_encoding(ResponseEncoding::Text)),
            items: vec![ResourceDescriptor::new("first.mp3")],
        };
        let mut args = args(&["second.mp3"]);
        args.base_url = Some("https://flag.test/".into());
        args.encoding = Some(ResponseEncoding::Binary);
        args.debug = true;

        let plan = FetchPlan::merge(manifest, &args).unwrap();
        let keys: Vec<_> = plan.items.iter().map(|d| d.key.as_str()).collect();
        assert_eq!(keys, vec!["first.mp3", "second.mp3"]);
        assert_eq!(plan.transport.base_url(), Some("https://flag.test/"));
        assert_eq!(plan.loader.response_encoding, ResponseEncoding::Binary);
        assert!(plan.loader.debug);
    }

    #[test]
    fn test_plan_uses_manifest_base_url() {
        let manifest = Manifest {
            base_url: Some("https://manifest.test/".into()),
            ..Manifest::default()
        };
        let plan = FetchPlan::merge(manifest, &args(&["a.mp3"])).unwrap();
        assert_eq!(
            plan.transport.base_url(),
            Some("https://manifest.test/")
        );
        assert_eq!(plan.transport.timeout(), Duration::from_secs(30));
    }

    #[test]
    fn test_format_event_plain() {
        let item = ResourceDescriptor::new("a.mp3");
        let loaded = LoaderEvent::ItemLoaded {
            result: MediaHandle::new("blob:1", "audio/mpeg", Bytes::from(vec![0u8; 4])),
            item: item.clone(),
        };
        assert_eq!(format_event(&loaded, false), "loaded  a.mp3 (audio/mpeg, 4 bytes)");

        let failed = LoaderEvent::item_error(item, FetchError::not_found("a.mp3"));
        assert!(format_event(&failed, false).starts_with("failed  a.mp3: error loading file"));
    }

    #[test]
    fn test_format_event_json() {
        let failed = LoaderEvent::item_error(
            ResourceDescriptor::new("b.mp3"),
            FetchError::network_with_status("bad gateway", 502),
        );
        let line: serde_json::Value =
            serde_json::from_str(&format_event(&failed, true)).unwrap();
        assert_eq!(line["type"], "itemError");
        assert_eq!(line["data"]["key"], "b.mp3");
    }

    #[test]
    fn test_format_summary() {
        let summary = ResultSummary {
            loaded: 2,
            errored: 1,
            total_errors: 1,
        };
        assert_eq!(format_summary(&summary, false), "2 loaded, 1 failed (1 errors)");

        let line: serde_json::Value =
            serde_json::from_str(&format_summary(&summary, true)).unwrap();
        assert_eq!(line["summary"]["loaded"], 2);
    }
}
