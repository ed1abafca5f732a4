use std::time::Duration;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use nakama_core::models::{CreatePost, StreamItem};
use nakama_core::{CoreRuntime, StreamView, View};
use serde::de::DeserializeOwned;
use tokio::sync::watch;

use super::render;

/// Print the feed, page backwards, and optionally follow the live channel.
pub async fn feed(
    runtime: &CoreRuntime,
    pages: usize,
    follow: bool,
    flush_every: Duration,
) -> Result<()> {
    runtime.navigate(View::Feed);
    let mut view = runtime.mount_feed();
    let line = render::feed_line;

    let items = view.initial_load().await.context("Failed to load feed")?;
    print_all(&items, line);

    for _ in 0..pages {
        let older = view.load_older().await.context("Failed to load older posts")?;
        if older.is_empty() {
            break;
        }
        print_all(&older, line);
    }
    if !view.has_more() {
        println!("(end of feed)");
    }

    if follow {
        follow_live(&mut view, flush_every, line).await;
    }
    view.unmount();
    Ok(())
}

/// Show the notification list; new events are handed to it by the runtime.
pub async fn notifications(
    runtime: &CoreRuntime,
    follow: bool,
    flush_every: Duration,
) -> Result<()> {
    runtime.navigate(View::Notifications);
    // Attach the list before the channel opens so no early event is missed
    let mut view = runtime.mount_notifications();
    runtime.start().await;
    let line = render::notification_line;

    let events = view
        .initial_load()
        .await
        .context("Failed to load notifications")?;
    if events.is_empty() {
        println!("(no notifications)");
    }
    print_all(&events, line);

    if follow {
        follow_live(&mut view, flush_every, line).await;
    }
    view.unmount();
    Ok(())
}

/// Stay on a neutral view and report OS notifications and badge changes.
pub async fn watch(runtime: &CoreRuntime, mut unauthorized: watch::Receiver<bool>) -> Result<()> {
    runtime.navigate(View::Other("/watch".to_string()));
    let mut badges = runtime.badges().watch();
    runtime.start().await;
    println!("{}", render::badge_line(*badges.borrow_and_update()));

    loop {
        tokio::select! {
            changed = badges.changed() => {
                if changed.is_err() {
                    break;
                }
                let state = *badges.borrow_and_update();
                println!("{}", render::badge_line(state));
            }
            changed = unauthorized.changed() => {
                if changed.is_err() {
                    break;
                }
                if *unauthorized.borrow_and_update() {
                    anyhow::bail!("Session rejected by the server; log in again");
                }
            }
            _ = tokio::signal::ctrl_c() => break,
        }
    }
    Ok(())
}

pub async fn post(runtime: &CoreRuntime, content: &str, spoiler_of: Option<&str>) -> Result<()> {
    let post = CreatePost::new(content, spoiler_of)?;
    let mut view = runtime.mount_feed();
    // Warm the cache first so the live echo of our own post is recognized
    view.initial_load().await.context("Failed to load feed")?;

    let submitted = view
        .submit_post(post)
        .await
        .context("Failed to publish post")?;
    let now = Utc::now();
    for item in submitted.flushed.iter().rev() {
        println!("{}", render::feed_line(item, now));
    }
    println!("{}", render::feed_line(&submitted.item, now));
    view.unmount();
    Ok(())
}

pub async fn unread(runtime: &CoreRuntime) -> Result<()> {
    if runtime.probe_unread().await {
        println!("unread notifications");
    } else {
        println!("no unread notifications");
    }
    Ok(())
}

fn print_all<T, F>(items: &[T], line: F)
where
    F: Fn(&T, DateTime<Utc>) -> String,
{
    let now = Utc::now();
    for item in items {
        println!("{}", line(item, now));
    }
}

/// Queue live items, print the pending label as it changes, flush on a timer.
async fn follow_live<T, F>(view: &mut StreamView<T>, flush_every: Duration, line: F)
where
    T: StreamItem + DeserializeOwned,
    F: Fn(&T, DateTime<Utc>) -> String,
{
    let mut ticker = tokio::time::interval(flush_every.max(Duration::from_secs(1)));
    ticker.tick().await;

    loop {
        tokio::select! {
            pending = view.next_live() => match pending {
                Some(_) => {
                    if let Some(label) = view.pending_label() {
                        println!("  ({})", label);
                    }
                }
                None => {
                    println!("(live channel closed)");
                    break;
                }
            },
            _ = ticker.tick() => {
                // Newest first, the way they now sit at the top of the list
                let flushed = view.flush();
                let now = Utc::now();
                for item in flushed.iter().rev() {
                    println!("{}", line(item, now));
                }
            }
            _ = tokio::signal::ctrl_c() => break,
        }
    }
}
