// In demos/actor.rs
//
// A counter actor whose mailbox is an unbounded chain. Producers never block on
// a full mailbox; Ctrl+C (or finishing the run) terminates the mailbox and the
// actor drains whatever is still buffered before exiting.
//
// cargo run --example actor -- <messages_per_producer> [producers]
use dmxp_chancell::Channel::{unbounded, Receiver, Sender};
use dmxp_chancell::Core::init_tracing;
use std::env;
use std::thread;
use std::time::Instant;

enum Msg {
    Add(u64),
    Report(Sender<u64>),
}

fn run_actor(mailbox: Receiver<Msg>) -> u64 {
    let mut total = 0u64;
    for msg in &mailbox {
        match msg {
            Msg::Add(n) => total += n,
            Msg::Report(reply) => {
                if reply.send(total).is_err() {
                    eprintln!("Actor: reply channel already closed");
                }
            }
        }
    }
    total
}

fn main() {
    init_tracing();

    let args: Vec<String> = env::args().collect();
    if args.len() < 2 {
        eprintln!("Usage: {} <messages_per_producer> [producers]", args[0]);
        std::process::exit(1);
    }
    let per_producer: u64 = args[1].parse().expect("Invalid number of messages");
    let producers: u64 = args
        .get(2)
        .map(|s| s.parse().expect("Invalid number of producers"))
        .unwrap_or(4);

    let (mailbox, inbox) = unbounded::<Msg>();

    let stopper = mailbox.clone();
    ctrlc::set_handler(move || {
        println!("Actor: Ctrl+C received, closing mailbox");
        stopper.close();
    })
    .expect("Error setting Ctrl+C handler");

    let actor = thread::spawn(move || run_actor(inbox));

    let start = Instant::now();
    let handles: Vec<_> = (0..producers)
        .map(|p| {
            let mailbox = mailbox.clone();
            thread::spawn(move || {
                let mut sent = 0u64;
                for i in 0..per_producer {
                    if mailbox.send(Msg::Add(i)).is_err() {
                        println!("Producer {}: actor gone after {} messages", p, sent);
                        break;
                    }
                    sent += 1;
                }
                sent
            })
        })
        .collect();
    let sent: u64 = handles.into_iter().map(|h| h.join().unwrap_or(0)).sum();
    let elapsed = start.elapsed();

    println!(
        "Producers: Sent {} messages in {:.2?} (mailbox segment now holds {})",
        sent,
        elapsed,
        mailbox.capacity()
    );

    let (reply_tx, reply_rx) = unbounded::<u64>();
    if mailbox.send(Msg::Report(reply_tx)).is_ok() {
        if let Some(total) = reply_rx.recv() {
            println!("Actor: running total {}", total);
        }
    }

    mailbox.close();
    mailbox.wait();
    drop(mailbox);
    let total = actor.join().unwrap_or(0);
    println!("Actor: Final total {}", total);
}
