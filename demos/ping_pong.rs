//! Ping-pong example - point-to-point communication between two ranks.
//!
//! Rank 0 sends a payload to rank 1 and gets it echoed back, once in each
//! transfer mode.
//!
//! Run with: cargo run --example ping_pong

use rally::{ping_pong, Cluster, Result, Transfer};

fn main() -> Result<()> {
    let cluster = Cluster::new(2)?;

    cluster.run(|comm| {
        let rank = comm.rank();

        let mut buf = if rank == 0 {
            vec![101.0, 102.0, 103.0]
        } else {
            vec![0.0; 3]
        };

        for transfer in [Transfer::Buffered, Transfer::Serialized] {
            println!("Rank {}: exchanging {:?} via {}", rank, buf, transfer);
            ping_pong(&comm, &mut buf, transfer)?;
            println!("Rank {}: now holds {:?}", rank, buf);

            // After one exchange both ranks hold rank 0's payload.
            assert_eq!(buf, vec![101.0, 102.0, 103.0], "Echo mismatch!");
            comm.barrier();
        }

        if rank == 0 {
            println!("\nPing-pong test passed!");
        }
        Ok(())
    })?;

    Ok(())
}
