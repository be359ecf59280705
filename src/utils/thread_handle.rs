// (C) Copyright IBM Corp. 2025.
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//      http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

use std::sync::mpsc::{Receiver, Sender};
use std::thread::JoinHandle;

#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) enum ThreadStatus<T> {
    Running,
    Finished(std::result::Result<T, String>),
}

/// Owns a worker thread and the channel used to ask it to terminate.
///
/// The closure receives the termination receiver. Calling [`ThreadHandle::terminate`]
/// or dropping the handle disconnects the channel; the worker is expected to observe
/// that and return. The thread is never joined on drop.
#[derive(Debug)]
pub(crate) struct ThreadHandle<T> {
    thread_termination_sender: Option<Sender<()>>,
    thread_handle: Option<JoinHandle<T>>,
    finished_thread_status_cached: Option<ThreadStatus<T>>,
}

impl<T: Send + Clone + 'static> ThreadHandle<T> {
    pub(crate) fn new<F>(name: &str, f: F) -> std::io::Result<Self>
    where
        F: FnOnce(Receiver<()>) -> T,
        F: Send + 'static,
    {
        let (thread_termination_sender, thread_termination_receiver) = std::sync::mpsc::channel();

        let t = std::thread::Builder::new()
            .name(name.to_string())
            .spawn(move || f(thread_termination_receiver))?;

        Ok(Self {
            thread_termination_sender: Some(thread_termination_sender),
            thread_handle: Some(t),
            finished_thread_status_cached: None,
        })
    }

    /// Asks the thread to finish. Does not wait for it.
    pub(crate) fn terminate(&mut self) {
        self.thread_termination_sender.take();
    }

    pub(crate) fn get_thread_status(&mut self) -> ThreadStatus<T> {
        if let Some(status) = &self.finished_thread_status_cached {
            return status.clone();
        }
        let Some(t) = self.thread_handle.take() else {
            unreachable!("either the handle or the cached status is always present")
        };
        if !t.is_finished() {
            self.thread_handle = Some(t);
            return ThreadStatus::Running;
        }
        let status = match t.join() {
            Ok(r) => ThreadStatus::Finished(Ok(r)),
            Err(e) => {
                let msg = if let Some(panic_msg) = e.downcast_ref::<String>() {
                    format!("Thread panicked: {}", panic_msg)
                } else if let Some(panic_msg) = e.downcast_ref::<&str>() {
                    format!("Thread panicked: {}", panic_msg)
                } else {
                    "Thread panicked".to_string()
                };
                ThreadStatus::Finished(Err(msg))
            }
        };
        self.finished_thread_status_cached = Some(status.clone());
        status
    }
}

#[cfg(test)]
mod tests {
    use std::sync::mpsc::RecvError;
    use std::thread::sleep;
    use std::time::Duration;

    use super::*;

    #[test]
    fn neverending_thread() {
        let (tx, rx) = std::sync::mpsc::channel();
        let mut handle = ThreadHandle::new("neverending", move |terminator| {
            let _ = terminator.recv();
            tx.send(()).unwrap();
        })
        .unwrap();

        assert_eq!(handle.get_thread_status(), ThreadStatus::Running);
        assert_eq!(handle.get_thread_status(), ThreadStatus::Running);

        drop(handle);
        // The worker noticed the termination and sent its message before leaving.
        assert_eq!(rx.recv(), Ok(()));
        assert_eq!(rx.recv().unwrap_err(), RecvError);
    }

    #[test]
    fn terminated_thread() {
        let mut handle = ThreadHandle::new("terminated", move |terminator| {
            let _ = terminator.recv();
            7
        })
        .unwrap();
        handle.terminate();
        handle.terminate();

        let start = std::time::Instant::now();
        while handle.get_thread_status() == ThreadStatus::Running {
            assert!(start.elapsed() < Duration::from_secs(1));
            sleep(Duration::from_millis(5));
        }
        assert_eq!(handle.get_thread_status(), ThreadStatus::Finished(Ok(7)));
    }

    #[test]
    fn panicking_thread() {
        let mut handle = ThreadHandle::<()>::new("panicking", move |_terminator| {
            panic!("panic for test");
        })
        .unwrap();
        let start = std::time::Instant::now();
        while handle.get_thread_status() == ThreadStatus::Running {
            assert!(start.elapsed() < Duration::from_secs(1));
            sleep(Duration::from_millis(5));
        }
        assert_eq!(
            handle.get_thread_status(),
            ThreadStatus::Finished(Err("Thread panicked: panic for test".to_string()))
        );
    }
}
