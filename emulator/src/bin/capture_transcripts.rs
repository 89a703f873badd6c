use std::io;

#[allow(dead_code)]
#[path = "../session.rs"]
mod session;

#[allow(dead_code)]
#[path = "../world.rs"]
mod world;

use session::{Session, TranscriptProfile};

fn main() -> io::Result<()> {
    record_profile(TranscriptProfile::Obstacle)?;
    record_profile(TranscriptProfile::Pause)?;
    Ok(())
}

fn record_profile(profile: TranscriptProfile) -> io::Result<()> {
    let mut session = Session::new(profile)?;
    match profile {
        TranscriptProfile::Obstacle => record_obstacle(&mut session),
        TranscriptProfile::Pause => record_pause(&mut session),
        TranscriptProfile::Console => Ok(()),
    }
}

fn start(session: &mut Session) -> io::Result<()> {
    session.handle_command("step")?;
    session.handle_command("tap")?;
    Ok(())
}

fn record_obstacle(session: &mut Session) -> io::Result<()> {
    session.handle_command("obstacle 600 -150 100 300")?;
    session.handle_command("help recovery")?;
    start(session)?;

    // Long enough to hit the box, go around it and square up again.
    for _ in 0..16 {
        session.handle_command("step 100")?;
    }
    session.handle_command("status")?;
    session.handle_command("log 12")?;
    Ok(())
}

fn record_pause(session: &mut Session) -> io::Result<()> {
    start(session)?;
    session.handle_command("step 20")?;
    session.handle_command("bump left")?;
    session.handle_command("step 10")?;

    session.handle_command("press")?;
    session.handle_command("step 5")?;
    session.handle_command("status")?;
    session.handle_command("release")?;
    session.handle_command("step 5")?;
    session.handle_command("tap")?;
    session.handle_command("step 40")?;
    session.handle_command("status")?;
    session.handle_command("bump sideways")?;
    session.handle_command("log")?;
    Ok(())
}
