use std::sync::{mpsc, Arc, Mutex};
use std::thread;

pub(crate) type Job = Box<dyn FnOnce() + Send + 'static>;

/// Fixed-size worker pool draining a shared job channel.
pub(crate) struct ThreadPool {
    workers: Vec<Worker>,
    sender: Option<mpsc::Sender<Job>>,
}

struct Worker {
    #[allow(dead_code)]
    id: usize,
    handle: Option<thread::JoinHandle<()>>,
}

impl ThreadPool {
    pub(crate) fn new(size: usize) -> ThreadPool {
        assert!(size > 0);

        let (sender, receiver) = mpsc::channel();
        let receiver = Arc::new(Mutex::new(receiver));

        let mut workers = Vec::with_capacity(size);
        for id in 0..size {
            workers.push(Worker::new(id, Arc::clone(&receiver)));
        }

        ThreadPool {
            workers,
            sender: Some(sender),
        }
    }

    pub(crate) fn execute<F>(&self, f: F) -> Result<(), mpsc::SendError<Job>>
    where
        F: FnOnce() + Send + 'static,
    {
        let job = Box::new(f);
        match &self.sender {
            Some(sender) => sender.send(job),
            None => Err(mpsc::SendError(job)),
        }
    }
}

impl Drop for ThreadPool {
    fn drop(&mut self) {
        // Closing the channel lets every worker drain and exit.
        drop(self.sender.take());

        for worker in &mut self.workers {
            if let Some(handle) = worker.handle.take() {
                if handle.join().is_err() {
                    log::warn!("worker thread panicked during shutdown");
                }
            }
        }
    }
}

impl Worker {
    fn new(id: usize, receiver: Arc<Mutex<mpsc::Receiver<Job>>>) -> Worker {
        let handle = thread::spawn(move || loop {
            let message = {
                let receiver = receiver.lock().unwrap();
                receiver.recv()
                // Lock released here, before the job runs.
            };
            match message {
                Ok(job) => job(),
                Err(_) => break, // Channel closed
            }
        });

        Worker {
            id,
            handle: Some(handle),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[test]
    fn pool_runs_every_job_before_shutdown() {
        let counter = Arc::new(AtomicUsize::new(0));
        {
            let pool = ThreadPool::new(4);
            for _ in 0..64 {
                let counter = Arc::clone(&counter);
                pool.execute(move || {
                    counter.fetch_add(1, Ordering::SeqCst);
                })
                .expect("pool accepts jobs while alive");
            }
            // Drop joins the workers after the channel drains.
        }
        assert_eq!(counter.load(Ordering::SeqCst), 64);
    }
}
