mod common;

use penumbra::buffer::UsageHint;
use penumbra::error::Error;
use penumbra::loader::{Loader, LoaderOpt};
use penumbra::{Context, ContextOpt};
use penumbra_fake::{FakeBackend, FakeLimits};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{mpsc, Arc};
use std::thread;
use std::time::Duration;

fn loader(opt: LoaderOpt) -> Loader<FakeBackend> {
  common::init_logger();
  Loader::new(opt, || Context::new(FakeBackend::new(), ContextOpt::default())).unwrap()
}

fn thread_name() -> String {
  thread::current().name().unwrap_or_default().to_owned()
}

#[test]
fn evaluate_runs_on_the_gl_thread() {
  let loader = loader(LoaderOpt::default().set_thread_name("eval"));

  let pending = loader
    .evaluate(|ctx| Ok((ctx.is_current(), thread_name())))
    .unwrap();

  assert_eq!(pending.wait().unwrap(), (true, "eval-gl".to_owned()));
  loader.shutdown().unwrap();
}

#[test]
fn load_decodes_then_uploads() {
  let loader = loader(LoaderOpt::default().set_thread_name("load").set_io_threads(3));

  let pending = loader
    .load(
      || Ok((thread_name(), 5)),
      |ctx, (decoder, count)| {
        let buffer =
          ctx.array_buffer_allocate(count, &common::vertex_descriptor(), UsageHint::StaticDraw)?;
        Ok((decoder, thread_name(), buffer))
      },
    )
    .unwrap();

  let (decoder, uploader, buffer) = pending.wait().unwrap();
  assert!(decoder.starts_with("load-io-"));
  assert_eq!(uploader, "load-gl");
  assert_eq!(buffer.element_count(), 5);
  assert_eq!(buffer.size_bytes(), 160);

  loader.shutdown().unwrap();
}

#[test]
fn decode_errors_skip_the_upload() {
  let loader = loader(LoaderOpt::default());
  let uploaded = Arc::new(AtomicBool::new(false));
  let flag = uploaded.clone();

  let pending = loader
    .load(
      || Err::<(), _>(Error::Io("missing.png".to_owned())),
      move |_, ()| {
        flag.store(true, Ordering::SeqCst);
        Ok(())
      },
    )
    .unwrap();

  assert_eq!(pending.wait(), Err(Error::Io("missing.png".to_owned())));
  loader.shutdown().unwrap();
  assert!(!uploaded.load(Ordering::SeqCst));
}

#[test]
fn cancelled_jobs_do_not_upload() {
  let loader = loader(LoaderOpt::default());
  let (gate, wait_gate) = mpsc::channel::<()>();
  let uploaded = Arc::new(AtomicBool::new(false));
  let flag = uploaded.clone();

  let pending = loader
    .load(
      move || {
        let _ = wait_gate.recv();
        Ok(())
      },
      move |_, ()| {
        flag.store(true, Ordering::SeqCst);
        Ok(())
      },
    )
    .unwrap();

  pending.cancel();
  assert!(pending.is_cancelled());
  gate.send(()).unwrap();

  assert_eq!(pending.wait(), Err(Error::Cancelled));
  loader.shutdown().unwrap();
  assert!(!uploaded.load(Ordering::SeqCst));
}

#[test]
fn wait_timeout_leaves_the_job_running() {
  let loader = loader(LoaderOpt::default());
  let (gate, wait_gate) = mpsc::channel::<()>();

  let pending = loader
    .load(
      move || {
        let _ = wait_gate.recv();
        Ok(21)
      },
      |_, half| Ok(half * 2),
    )
    .unwrap();

  let timeout = Duration::from_millis(10);
  assert_eq!(pending.wait_timeout(timeout), Err(Error::Timeout(timeout)));

  gate.send(()).unwrap();
  assert_eq!(pending.wait(), Ok(42));

  loader.shutdown().unwrap();
}

#[test]
fn panicking_jobs_are_cancelled() {
  let loader = loader(LoaderOpt::default());

  let panicking = loader
    .evaluate::<(), _>(|_| panic!("upload failed badly"))
    .unwrap();
  assert_eq!(panicking.wait(), Err(Error::Cancelled));

  let decode_panics = loader
    .load::<(), (), _, _>(|| panic!("decode failed badly"), |_, ()| Ok(()))
    .unwrap();
  assert_eq!(decode_panics.wait(), Err(Error::Cancelled));

  // the threads survive
  let pending = loader.evaluate(|ctx| ctx.vendor()).unwrap();
  assert_eq!(pending.wait().unwrap(), "penumbra");

  loader.shutdown().unwrap();
}

#[test]
fn shutdown_completes_queued_jobs() {
  let loader = loader(LoaderOpt::default());

  let pending: Vec<_> = (0..8u32)
    .map(|i| loader.load(move || Ok(i), |_, i| Ok(i + 1)).unwrap())
    .collect();

  loader.shutdown().unwrap();

  let results: Vec<_> = pending.into_iter().map(|p| p.wait().unwrap()).collect();
  assert_eq!(results, (1..=8).collect::<Vec<_>>());
}

#[test]
fn shutdown_times_out() {
  let loader = loader(LoaderOpt::default().set_shutdown_timeout(Duration::from_millis(10)));

  let _slow = loader
    .evaluate(|_| {
      thread::sleep(Duration::from_millis(500));
      Ok(())
    })
    .unwrap();

  assert_eq!(
    loader.shutdown(),
    Err(Error::Timeout(Duration::from_millis(10)))
  );
}

#[test]
fn context_creation_errors_are_reported() {
  common::init_logger();

  let failed = Loader::<FakeBackend>::new(LoaderOpt::default(), || {
    Err(Error::driver("no display"))
  });
  assert!(matches!(failed, Err(Error::Driver(ref reason)) if reason == "no display"));

  let limits = FakeLimits::default().set_max_draw_buffers(2);
  let failed = Loader::new(LoaderOpt::default(), move || {
    Context::new(FakeBackend::with_limits(limits), ContextOpt::default())
  });
  assert!(matches!(failed, Err(Error::NonCompliantImplementation(_))));
}
