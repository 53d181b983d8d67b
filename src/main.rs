fn main() -> alterra_admin::error::Result<()> {
    alterra_admin::main()
}
