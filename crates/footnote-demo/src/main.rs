//! Fixed Footnotes demo
//!
//! Lays out a document, scrolls through it in an 800x600 in-memory window
//! and prints the overlay after every settled scroll step.
//!
//! Usage: `footnote-demo [page.html] [options.json]`

use std::rc::Rc;

use anyhow::{Context, Result};
use fixed_footnotes::{Config, Options};
use footnote_dom::{inner_html, parse_html, FlowLayout, MemoryWindow};
use tracing_subscriber::EnvFilter;

const SAMPLE: &str = r##"<!DOCTYPE html>
<html>
<head><title>Fixed footnotes</title></head>
<body>
  <h1>On footnotes</h1>
  <p>Footnotes<a class="reference" href="#fn1">1</a> keep asides out of the running text,
     but the reader has to jump to the bottom of the page to read them.</p>
  <p>An overlay can show the note while its marker is on screen<a class="reference" href="#fn2">2</a>.</p>
  <p>Lorem ipsum dolor sit amet, consectetur adipiscing elit, sed do eiusmod tempor.</p>
  <p>Ut enim ad minim veniam, quis nostrud exercitation ullamco laboris nisi ut aliquip.</p>
  <p>Duis aute irure dolor in reprehenderit in voluptate velit esse cillum dolore.</p>
  <p>Excepteur sint occaecat cupidatat non proident, sunt in culpa qui officia.</p>
  <p>Sed ut perspiciatis unde omnis iste natus error sit voluptatem accusantium.</p>
  <p>Nemo enim ipsam voluptatem quia voluptas sit aspernatur aut odit aut fugit.</p>
  <p>Neque porro quisquam est, qui dolorem ipsum quia dolor sit amet, consectetur.</p>
  <p>Quis autem vel eum iure reprehenderit qui in ea voluptate velit esse quam.</p>
  <p>At vero eos et accusamus et iusto odio dignissimos ducimus qui blanditiis.</p>
  <p>Late in the text, a third marker<a class="reference" href="#fn3">3</a> appears.</p>
  <p>Nam libero tempore, cum soluta nobis est eligendi optio cumque nihil impedit.</p>
  <p>Temporibus autem quibusdam et aut officiis debitis aut rerum necessitatibus.</p>
  <p>Itaque earum rerum hic tenetur a sapiente delectus, ut aut reiciendis.</p>
  <p>Similique sunt in culpa qui officia deserunt mollitia animi, id est laborum.</p>
  <p>Et harum quidem rerum facilis est et expedita distinctio nam libero tempore.</p>
  <p>Omnis voluptas assumenda est, omnis dolor repellendus temporibus autem.</p>
  <p>Quibusdam et aut officiis debitis aut rerum necessitatibus saepe eveniet.</p>
  <p>Ut et voluptates repudiandae sint et molestiae non recusandae itaque earum.</p>
  <p>Hic tenetur a sapiente delectus, ut aut reiciendis voluptatibus maiores.</p>
  <p>Alias consequatur aut perferendis doloribus asperiores repellat lorem ipsum.</p>
  <p>Dolor sit amet, consectetur adipiscing elit, sed do eiusmod tempor incididunt.</p>
  <p>Labore et dolore magna aliqua, ut enim ad minim veniam quis nostrud.</p>
  <p>Exercitation ullamco laboris nisi ut aliquip ex ea commodo consequat duis.</p>
  <p>Aute irure dolor in reprehenderit in voluptate velit esse cillum dolore eu.</p>
  <p>Fugiat nulla pariatur, excepteur sint occaecat cupidatat non proident sunt.</p>
  <p>In culpa qui officia deserunt mollit anim id est laborum sed ut perspiciatis.</p>
  <ol class="footnotes">
    <li id="fn1">A note placed <em id="fn1-em">far</em> from its marker.</li>
    <li id="fn2">Copied into the overlay with its ids removed.</li>
    <li id="fn3">Shown once the first two scroll away.</li>
  </ol>
</body>
</html>"##;

const URL: &str = "https://example.com/demo.html";
const VIEWPORT: (f64, f64) = (800.0, 600.0);
const STEP: f64 = 150.0;

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let mut args = std::env::args().skip(1);
    let html = match args.next() {
        Some(path) => {
            std::fs::read_to_string(&path).with_context(|| format!("reading {path}"))?
        }
        None => SAMPLE.to_string(),
    };
    let config = match args.next() {
        Some(path) => {
            let json = std::fs::read_to_string(&path).with_context(|| format!("reading {path}"))?;
            serde_json::from_str::<Config>(&json).with_context(|| format!("parsing {path}"))?
        }
        None => Config::default(),
    };
    let settle = config.throttle_interval() + config.frame_fallback_delay();

    let mut document = parse_html(&html, URL);
    let height = FlowLayout::new(VIEWPORT.0, 20.0, 8.0).apply(&mut document);
    tracing::info!("Document '{}' is {} px tall", document.title(), height);

    let window = Rc::new(MemoryWindow::new(document, VIEWPORT.0, VIEWPORT.1));
    let footnotes = fixed_footnotes::create(Options::from(config), window.clone())?;

    let painted = window.clone();
    let content = *footnotes.content();
    footnotes.add_refresh_listener(Rc::new(move || {
        let (_, y) = painted.scroll_position();
        let document = painted.document();
        println!("scrollY={:>6.0}  {}", y, inner_html(document.tree(), content));
    }));

    println!("scrollY={:>6.0}  {}", 0.0, inner_html(window.document().tree(), content));

    let max_scroll = (height - VIEWPORT.1).max(0.0);
    while window.scroll_position().1 < max_scroll {
        window.scroll_by(0.0, STEP);
        window.advance(settle);
    }

    footnotes.stop()?;
    Ok(())
}
