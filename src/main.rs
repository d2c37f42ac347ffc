fn main() -> anyhow::Result<()> {
    track_manager_lib::run()
}
