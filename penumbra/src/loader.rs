//! Asynchronous loading.
//!
//! A [`Loader`] runs a two-stage pipeline: decoding runs on a pool of I/O threads and produces a
//! plain value, which is then handed to a single GL thread that owns a [`Context`] and uploads it.
//! The only things crossing threads are jobs and their results.
//!
//! Cancelling a job through its [`Pending`] prevents its upload from running if it has not
//! started yet; it never interrupts a driver call in flight.

use crate::backend::Backend;
use crate::context::Context;
use crate::error::Error;
use log::{debug, error, warn};
use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender};
use std::sync::{Arc, Mutex};
use std::thread::{self, JoinHandle};
use std::time::Duration;

/// Loader options.
#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub struct LoaderOpt {
  io_threads: usize,
  thread_name: String,
  shutdown_timeout: Duration,
}

impl Default for LoaderOpt {
  /// Defaults:
  ///
  /// - `io_threads`: `2`
  /// - `thread_name`: `"penumbra"`
  /// - `shutdown_timeout`: 5 seconds
  fn default() -> Self {
    LoaderOpt {
      io_threads: 2,
      thread_name: "penumbra".to_owned(),
      shutdown_timeout: Duration::from_secs(5),
    }
  }
}

impl LoaderOpt {
  /// Number of I/O threads (at least one is spawned).
  #[inline]
  pub fn set_io_threads(self, io_threads: usize) -> Self {
    LoaderOpt { io_threads, ..self }
  }

  /// Number of I/O threads.
  #[inline]
  pub fn io_threads(&self) -> usize {
    self.io_threads
  }

  /// Prefix of the names of the spawned threads.
  #[inline]
  pub fn set_thread_name(self, thread_name: impl Into<String>) -> Self {
    LoaderOpt {
      thread_name: thread_name.into(),
      ..self
    }
  }

  /// Prefix of the names of the spawned threads.
  #[inline]
  pub fn thread_name(&self) -> &str {
    &self.thread_name
  }

  /// How long [`Loader::shutdown`] waits for the GL thread.
  #[inline]
  pub fn set_shutdown_timeout(self, shutdown_timeout: Duration) -> Self {
    LoaderOpt {
      shutdown_timeout,
      ..self
    }
  }

  /// How long [`Loader::shutdown`] waits for the GL thread.
  #[inline]
  pub fn shutdown_timeout(&self) -> Duration {
    self.shutdown_timeout
  }
}

type GlJob<B> = Box<dyn FnOnce(&mut Context<B>) + Send>;
type IoJob = Box<dyn FnOnce() + Send>;

/// Result of a job, available once the job completes.
#[derive(Debug)]
pub struct Pending<T> {
  result: Receiver<Result<T, Error>>,
  cancelled: Arc<AtomicBool>,
}

impl<T> Pending<T> {
  /// Prevent the upload from running if it has not started yet.
  pub fn cancel(&self) {
    self.cancelled.store(true, Ordering::Release);
  }

  /// Whether [`Pending::cancel`] was called.
  pub fn is_cancelled(&self) -> bool {
    self.cancelled.load(Ordering::Acquire)
  }

  /// Block until the job completes.
  ///
  /// # Errors
  ///
  /// Fails with [`Error::Cancelled`] if the job was cancelled or abandoned (because the loader
  /// shut down or the job panicked), or with whatever error the job itself returned.
  pub fn wait(self) -> Result<T, Error> {
    self.result.recv().unwrap_or(Err(Error::Cancelled))
  }

  /// Block until the job completes, for at most `timeout`.
  ///
  /// On [`Error::Timeout`], the job keeps running and can be waited for again.
  pub fn wait_timeout(&self, timeout: Duration) -> Result<T, Error> {
    match self.result.recv_timeout(timeout) {
      Ok(result) => result,
      Err(RecvTimeoutError::Timeout) => Err(Error::Timeout(timeout)),
      Err(RecvTimeoutError::Disconnected) => Err(Error::Cancelled),
    }
  }
}

/// Two-stage asynchronous loader.
#[derive(Debug)]
pub struct Loader<B> {
  gl: Option<Sender<GlJob<B>>>,
  io: Option<Sender<IoJob>>,
  gl_thread: Option<JoinHandle<()>>,
  io_threads: Vec<JoinHandle<()>>,
  done: Receiver<()>,
  shutdown_timeout: Duration,
}

impl<B> Loader<B>
where
  B: Backend + 'static,
{
  /// Spawn the GL thread, which creates its context with `make_context`, and the I/O threads.
  ///
  /// # Errors
  ///
  /// Fails with the error of `make_context`, or with [`Error::Io`] if a thread cannot be spawned.
  pub fn new<F>(opt: LoaderOpt, make_context: F) -> Result<Self, Error>
  where
    F: FnOnce() -> Result<Context<B>, Error> + Send + 'static,
  {
    let (gl_sender, gl_receiver) = mpsc::channel::<GlJob<B>>();
    let (ready_sender, ready_receiver) = mpsc::channel();
    let (done_sender, done) = mpsc::channel();

    let gl_thread = thread::Builder::new()
      .name(format!("{}-gl", opt.thread_name))
      .spawn(move || {
        let mut ctx = match make_context() {
          Ok(ctx) => ctx,
          Err(e) => {
            error!("cannot create the loader context: {}", e);
            let _ = ready_sender.send(Err(e));
            return;
          }
        };

        let _ = ready_sender.send(Ok(()));

        for job in gl_receiver {
          if panic::catch_unwind(AssertUnwindSafe(|| job(&mut ctx))).is_err() {
            error!("an upload job panicked");
          }
        }

        if let Err(e) = ctx.release_current() {
          warn!("cannot release the loader context: {}", e);
        }

        drop(ctx);
        let _ = done_sender.send(());
      })?;

    ready_receiver.recv().unwrap_or_else(|_| {
      Err(Error::driver("the GL thread exited before creating its context"))
    })?;

    let (io_sender, io_receiver) = mpsc::channel::<IoJob>();
    let io_receiver = Arc::new(Mutex::new(io_receiver));
    let mut io_threads = Vec::new();

    for i in 0..opt.io_threads.max(1) {
      let receiver = io_receiver.clone();

      let handle = thread::Builder::new()
        .name(format!("{}-io-{}", opt.thread_name, i))
        .spawn(move || loop {
          let job = match receiver.lock() {
            Ok(receiver) => receiver.recv(),
            Err(poisoned) => poisoned.into_inner().recv(),
          };

          match job {
            Ok(job) => {
              if panic::catch_unwind(AssertUnwindSafe(job)).is_err() {
                error!("a decode job panicked");
              }
            }

            Err(_) => break,
          }
        })?;

      io_threads.push(handle);
    }

    debug!(
      "loader started with {} I/O threads",
      opt.io_threads.max(1)
    );

    Ok(Loader {
      gl: Some(gl_sender),
      io: Some(io_sender),
      gl_thread: Some(gl_thread),
      io_threads,
      done,
      shutdown_timeout: opt.shutdown_timeout,
    })
  }

  /// Decode a value on an I/O thread, then upload it on the GL thread.
  ///
  /// If `decode` fails, `upload` never runs and the error is the result of the job.
  pub fn load<T, V, D, U>(&self, decode: D, upload: U) -> Result<Pending<T>, Error>
  where
    T: Send + 'static,
    V: Send + 'static,
    D: FnOnce() -> Result<V, Error> + Send + 'static,
    U: FnOnce(&mut Context<B>, V) -> Result<T, Error> + Send + 'static,
  {
    let io = self.io.as_ref().ok_or_else(shut_down)?;
    let gl = self.gl.as_ref().ok_or_else(shut_down)?.clone();
    let (sender, result) = mpsc::channel();
    let cancelled = Arc::new(AtomicBool::new(false));
    let job_cancelled = cancelled.clone();

    let job: IoJob = Box::new(move || {
      if job_cancelled.load(Ordering::Acquire) {
        let _ = sender.send(Err(Error::Cancelled));
        return;
      }

      let value = match decode() {
        Ok(value) => value,
        Err(e) => {
          let _ = sender.send(Err(e));
          return;
        }
      };

      let upload: GlJob<B> = Box::new(move |ctx| {
        if job_cancelled.load(Ordering::Acquire) {
          let _ = sender.send(Err(Error::Cancelled));
        } else {
          let _ = sender.send(upload(ctx, value));
        }
      });

      // a closed GL queue drops the job and its sender, which cancels it
      let _ = gl.send(upload);
    });

    io.send(job).map_err(|_| shut_down())?;

    Ok(Pending { result, cancelled })
  }

  /// Run a function on the GL thread.
  pub fn evaluate<T, F>(&self, f: F) -> Result<Pending<T>, Error>
  where
    T: Send + 'static,
    F: FnOnce(&mut Context<B>) -> Result<T, Error> + Send + 'static,
  {
    let gl = self.gl.as_ref().ok_or_else(shut_down)?;
    let (sender, result) = mpsc::channel();
    let cancelled = Arc::new(AtomicBool::new(false));
    let job_cancelled = cancelled.clone();

    let job: GlJob<B> = Box::new(move |ctx| {
      if job_cancelled.load(Ordering::Acquire) {
        let _ = sender.send(Err(Error::Cancelled));
      } else {
        let _ = sender.send(f(ctx));
      }
    });

    gl.send(job).map_err(|_| shut_down())?;

    Ok(Pending { result, cancelled })
  }

  /// Stop accepting jobs and wait for the queued ones to complete and the GL thread to release
  /// its context.
  ///
  /// # Errors
  ///
  /// Fails with [`Error::Timeout`] if the GL thread does not finish within the shutdown timeout.
  /// The threads are left running in that case.
  pub fn shutdown(mut self) -> Result<(), Error> {
    self.close();

    match self.done.recv_timeout(self.shutdown_timeout) {
      Ok(()) => (),

      Err(RecvTimeoutError::Timeout) => {
        error!(
          "loader did not shut down within {:?}",
          self.shutdown_timeout
        );
        return Err(Error::Timeout(self.shutdown_timeout));
      }

      Err(RecvTimeoutError::Disconnected) => {
        return Err(Error::driver("the GL thread exited abnormally"));
      }
    }

    let mut panicked = false;

    for handle in self.gl_thread.take().into_iter().chain(self.io_threads.drain(..)) {
      panicked |= handle.join().is_err();
    }

    if panicked {
      return Err(Error::driver("a loader thread panicked"));
    }

    debug!("loader shut down");
    Ok(())
  }

  fn close(&mut self) {
    self.io = None;
    self.gl = None;
  }
}

impl<B> Drop for Loader<B> {
  fn drop(&mut self) {
    self.io = None;
    self.gl = None;
  }
}

fn shut_down() -> Error {
  Error::constraint("the loader is shut down")
}
